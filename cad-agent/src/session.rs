use crate::{
    code::{extract_code, DrawingCode},
    Conversation, PipelineError, Progress, SessionParams, Stage,
};
use cad_sdk::{
    AssistantRequest, AssistantService, EntityStats, ExecutionRequest, ExecutionResult,
    ExecutionService, ServiceError,
};
use std::sync::Arc;
use tracing::{info, warn};

/// One failed execution attempt, kept in [`RetryState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionFailure {
    pub attempt: usize,
    /// The raw error string reported by the execution service.
    pub error: String,
}

/// Bookkeeping of the bounded execute/repair loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    /// The current attempt, starting at 1.
    pub attempt: usize,
    pub max_attempts: usize,
    pub failures: Vec<ExecutionFailure>,
}

impl RetryState {
    #[must_use]
    pub fn new(max_attempts: usize) -> Self {
        Self {
            attempt: 1,
            max_attempts: max_attempts.max(1),
            failures: Vec::new(),
        }
    }

    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_attempts
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.failures.last().map(|failure| failure.error.as_str())
    }
}

/// A drawing produced by a successful attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairOutcome {
    pub drawing: String,
    pub stats: EntityStats,
    pub retry: RetryState,
}

/// Drives the analyze, author and execute/repair steps against the remote
/// services. The session holds no conversation of its own; callers pass the
/// conversation to every step.
pub struct GenerationSession {
    assistant: Arc<dyn AssistantService>,
    executor: Arc<dyn ExecutionService>,
    params: SessionParams,
}

impl GenerationSession {
    pub fn new(
        assistant: Arc<dyn AssistantService>,
        executor: Arc<dyn ExecutionService>,
        params: SessionParams,
    ) -> Self {
        Self {
            assistant,
            executor,
            params,
        }
    }

    #[must_use]
    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    #[must_use]
    pub fn assistant(&self) -> Arc<dyn AssistantService> {
        Arc::clone(&self.assistant)
    }

    /// Ask the assistant to analyze the request. The user text and the reply
    /// are appended to `conversation`.
    pub async fn analyze(
        &self,
        conversation: &mut Conversation,
        user_text: &str,
    ) -> Result<String, PipelineError> {
        let request = AssistantRequest::new(user_text, &self.params.analysis_system_prompt)
            .with_history(conversation.history());
        let content = self.complete(request).await?;

        conversation.push_exchange(user_text, content.clone());
        Ok(content)
    }

    /// Whether the analysis asks the user for more information instead of
    /// describing a design.
    #[must_use]
    pub fn needs_clarification(&self, analysis: &str) -> bool {
        let analysis = analysis.to_lowercase();
        self.params
            .clarification_markers
            .iter()
            .any(|marker| analysis.contains(marker.as_str()))
    }

    /// Ask the assistant for drawing code implementing the analysis.
    pub async fn author(
        &self,
        conversation: &mut Conversation,
        analysis: &str,
    ) -> Result<DrawingCode, PipelineError> {
        let prompt = crate::prompts::authoring_prompt(analysis, &self.params.code_language);
        let request = AssistantRequest::new(prompt.clone(), &self.params.code_gen_system_prompt)
            .with_code_gen(true)
            .with_history(conversation.history());
        let content = self.complete(request).await?;

        conversation.push_exchange(prompt, content.clone());
        let suffix = extract_code(&content, &self.params.code_language);
        Ok(DrawingCode::new(Arc::clone(&self.params.preamble), suffix))
    }

    /// Execute `code`, asking the assistant to repair it after each failure,
    /// up to `max_attempts` executions. `code` always holds the most recent
    /// version when this returns, whether or not a drawing was produced.
    pub async fn execute_with_repair(
        &self,
        conversation: &mut Conversation,
        code: &mut DrawingCode,
        progress: &mut Progress,
    ) -> Result<RepairOutcome, PipelineError> {
        let mut retry = RetryState::new(self.params.max_attempts);

        loop {
            let attempt = retry.attempt;
            let max_attempts = retry.max_attempts;
            progress.set_stage(
                Stage::Executing,
                format!("Executing DXF code (attempt {attempt}/{max_attempts})..."),
            );
            progress.log(format!("Attempt {attempt}/{max_attempts}: Executing code..."));
            info!(attempt, max_attempts, "executing drawing code");

            let result = match self.execute(code).await {
                Ok(result) => result,
                Err(error) => return Err(Self::fail(progress, error)),
            };

            let error = match result {
                ExecutionResult::Drawing { drawing, stats } => {
                    progress.log(format!(
                        "Success: Generated {} entities in {} layers",
                        stats.entity_count, stats.layer_count
                    ));
                    progress.set_stage(Stage::Success, "DXF generated successfully!");
                    info!(attempt, entities = stats.entity_count, "drawing generated");
                    return Ok(RepairOutcome {
                        drawing,
                        stats,
                        retry,
                    });
                }
                ExecutionResult::Failed { error } => error,
            };

            progress.log(format!("Error: {error}"));
            warn!(attempt, error = %error, "execution attempt failed");
            retry.failures.push(ExecutionFailure {
                attempt,
                error: error.clone(),
            });

            if !retry.can_retry() {
                progress.set_stage(Stage::Error, "Failed to generate DXF after all retries");
                return Err(PipelineError::ExhaustedRetries {
                    attempts: attempt,
                    message: error,
                });
            }

            progress.set_stage(Stage::Fixing, "Code error detected, fixing...");
            progress.log("Requesting code repair from assistant...");
            match self.repair(conversation, code, error).await {
                Ok(repaired) => *code = repaired,
                Err(error) => return Err(Self::fail(progress, error)),
            }
            retry.attempt += 1;
        }
    }

    async fn execute(&self, code: &DrawingCode) -> Result<ExecutionResult, PipelineError> {
        let response = self
            .executor
            .execute(ExecutionRequest::new(code.full()))
            .await?;
        Ok(response.into_result()?)
    }

    /// The previous full code goes out as the user message with the raw error
    /// as context. Only the suffix of the reply is kept.
    async fn repair(
        &self,
        conversation: &mut Conversation,
        code: &DrawingCode,
        error: String,
    ) -> Result<DrawingCode, PipelineError> {
        let full = code.full();
        let request = AssistantRequest::new(full.clone(), &self.params.code_gen_system_prompt)
            .with_code_gen(true)
            .with_history(conversation.history())
            .with_error_context(error);
        let content = self.complete(request).await?;

        conversation.push_exchange(full, content.clone());
        let suffix = extract_code(&content, &self.params.code_language);
        Ok(DrawingCode::new(Arc::clone(&self.params.preamble), suffix))
    }

    async fn complete(&self, request: AssistantRequest) -> Result<String, PipelineError> {
        let response = self.assistant.complete(request).await?;
        if response.content.trim().is_empty() {
            return Err(ServiceError::Invariant(
                self.assistant.provider(),
                "assistant returned empty content".to_string(),
            )
            .into());
        }
        Ok(response.content)
    }

    fn fail(progress: &mut Progress, error: PipelineError) -> PipelineError {
        let message = error.to_string();
        progress.log(format!("Exception: {message}"));
        progress.set_stage(Stage::Error, message);
        warn!(error = %error, "remote call failed during execution");
        error
    }
}
