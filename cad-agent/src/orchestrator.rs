use crate::{
    code::DrawingCode,
    illustration::{generate_view_prompts, illustrate_all, Illustration},
    opentelemetry::{trace_pipeline, PipelineSpanMethod},
    summary::{generate_design_summary, DesignSummary},
    Conversation, GenerationSession, PipelineError, PipelineEvent, PipelineObserver, Progress,
    RepairOutcome, Stage, StageStatus,
};
use cad_sdk::{AssistantService, ConversationTurn, EntityStats, IllustrationService};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tracing::{info, info_span, warn};
use tracing_futures::Instrument;

pub const DXF_CONTENT_TYPE: &str = "application/dxf";

/// A drawing produced by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDrawing {
    /// The drawing document text.
    pub drawing: String,
    pub stats: EntityStats,
    /// Execution attempts it took, including the successful one.
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The analysis asked for more information. Nothing was generated.
    NeedsClarification { analysis: String },
    Drawing(GeneratedDrawing),
}

/// A drawing offered for saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingDownload {
    pub filename: String,
    pub content_type: &'static str,
    pub content: String,
}

impl DrawingDownload {
    /// Name the download after a unix timestamp in milliseconds.
    #[must_use]
    pub fn at(content: impl Into<String>, unix_millis: i64) -> Self {
        Self {
            filename: format!("engineering-cad-{unix_millis}.dxf"),
            content_type: DXF_CONTENT_TYPE,
            content: content.into(),
        }
    }
}

struct PipelineState {
    /// History sent with every assistant request. Only the session adds to it.
    conversation: Conversation,
    /// What the user sees: requests, analyses and error lines.
    transcript: Vec<ConversationTurn>,
    progress: Progress,
    code: DrawingCode,
    drawing: Option<GeneratedDrawing>,
    error: Option<String>,
}

#[derive(Default)]
struct AuxiliaryResults {
    design_summary: Option<DesignSummary>,
    illustrations: Vec<Illustration>,
}

/// Sits between the pipeline and the caller's observer: keeps the latest
/// stage and auxiliary results, then forwards every event.
struct Recorder {
    status: watch::Sender<StageStatus>,
    auxiliary: StdMutex<AuxiliaryResults>,
    inner: Arc<dyn PipelineObserver>,
}

impl Recorder {
    fn auxiliary(&self) -> std::sync::MutexGuard<'_, AuxiliaryResults> {
        self.auxiliary.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PipelineObserver for Recorder {
    fn on_event(&self, event: PipelineEvent) {
        match &event {
            PipelineEvent::Stage(status) => {
                self.status.send_replace(status.clone());
            }
            PipelineEvent::DesignSummary(summary) => {
                self.auxiliary().design_summary = Some(summary.clone());
            }
            PipelineEvent::Illustration(illustration) => {
                self.auxiliary().illustrations.push(illustration.clone());
            }
            _ => {}
        }
        self.inner.on_event(event);
    }
}

/// Runs whole requests end to end: analysis, authoring and the execute/repair
/// loop in sequence, with the design summary and illustrations generated by
/// spawned tasks alongside. One run at a time; a submission while another is
/// in flight is rejected with [`PipelineError::Busy`].
pub struct Orchestrator {
    session: Arc<GenerationSession>,
    auxiliary_assistant: Arc<dyn AssistantService>,
    illustrator: Option<Arc<dyn IllustrationService>>,
    design_summary: bool,
    recorder: Arc<Recorder>,
    state: Mutex<PipelineState>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Orchestrator {
    /// An orchestrator with design summaries enabled and no illustrator.
    /// Auxiliary calls go to the session's assistant.
    pub fn new(session: GenerationSession, observer: Arc<dyn PipelineObserver>) -> Self {
        let (status, _) = watch::channel(StageStatus::default());
        let recorder = Arc::new(Recorder {
            status,
            auxiliary: StdMutex::new(AuxiliaryResults::default()),
            inner: observer,
        });
        let state = PipelineState {
            conversation: Conversation::new(),
            transcript: Vec::new(),
            progress: Progress::new(recorder.clone()),
            code: DrawingCode::new(Arc::clone(&session.params().preamble), ""),
            drawing: None,
            error: None,
        };

        Self {
            auxiliary_assistant: session.assistant(),
            session: Arc::new(session),
            illustrator: None,
            design_summary: true,
            recorder,
            state: Mutex::new(state),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Use a separate assistant for the design summary and image prompts.
    #[must_use]
    pub fn with_auxiliary_assistant(mut self, assistant: Arc<dyn AssistantService>) -> Self {
        self.auxiliary_assistant = assistant;
        self
    }

    /// Generate illustrations of each analyzed design.
    #[must_use]
    pub fn with_illustrator(mut self, illustrator: Arc<dyn IllustrationService>) -> Self {
        self.illustrator = Some(illustrator);
        self
    }

    #[must_use]
    pub fn with_design_summary(mut self, enabled: bool) -> Self {
        self.design_summary = enabled;
        self
    }

    /// Run a request through analysis, authoring and execution.
    pub async fn submit(&self, text: &str) -> Result<SubmitOutcome, PipelineError> {
        let Ok(mut state) = self.state.try_lock() else {
            return Err(PipelineError::Busy);
        };
        if text.trim().is_empty() {
            return Err(PipelineError::Validation("Message is required".to_string()));
        }

        trace_pipeline(PipelineSpanMethod::Submit, self.run_submit(&mut state, text)).await
    }

    async fn run_submit(
        &self,
        state: &mut PipelineState,
        text: &str,
    ) -> Result<SubmitOutcome, PipelineError> {
        state.transcript.push(ConversationTurn::user(text));
        state.progress.clear_log();
        state.error = None;
        state
            .progress
            .set_stage(Stage::Analyzing, "Analyzing engineering requirements...");
        info!(length = text.len(), "request submitted");

        let analysis = match self.session.analyze(&mut state.conversation, text).await {
            Ok(analysis) => analysis,
            Err(error) => return Err(Self::record_error(state, error)),
        };
        state
            .transcript
            .push(ConversationTurn::assistant(analysis.clone()));

        if self.session.needs_clarification(&analysis) {
            state
                .progress
                .set_stage(Stage::Idle, "Waiting for more information...");
            return Ok(SubmitOutcome::NeedsClarification { analysis });
        }

        self.spawn_auxiliary(&analysis).await;

        state
            .progress
            .set_stage(Stage::Generating, "Generating Python code...");
        let mut code = match self.session.author(&mut state.conversation, &analysis).await {
            Ok(code) => code,
            Err(error) => return Err(Self::record_error(state, error)),
        };

        let result = self
            .session
            .execute_with_repair(&mut state.conversation, &mut code, &mut state.progress)
            .await;
        state.code = code;

        Self::finish(state, result).map(SubmitOutcome::Drawing)
    }

    /// Run the execute/repair loop again on the current code, including any
    /// edits made through [`Orchestrator::set_code`]. Before anything has been
    /// authored the current code is the bare preamble.
    pub async fn regenerate(&self) -> Result<GeneratedDrawing, PipelineError> {
        let Ok(mut state) = self.state.try_lock() else {
            return Err(PipelineError::Busy);
        };

        trace_pipeline(PipelineSpanMethod::Regenerate, async {
            let state = &mut *state;
            state.progress.clear_log();
            state.error = None;

            let result = self
                .session
                .execute_with_repair(
                    &mut state.conversation,
                    &mut state.code,
                    &mut state.progress,
                )
                .await;

            Self::finish(state, result)
        })
        .await
    }

    /// Replace the current code with a hand-edited version.
    pub fn set_code(&self, full: impl Into<String>) -> Result<(), PipelineError> {
        let Ok(mut state) = self.state.try_lock() else {
            return Err(PipelineError::Busy);
        };
        state.code = DrawingCode::from_full(
            Arc::clone(&self.session.params().preamble),
            full,
        );
        Ok(())
    }

    /// The current drawing, named with the current time.
    pub async fn download(&self) -> Option<DrawingDownload> {
        let state = self.state.lock().await;
        let drawing = state.drawing.as_ref()?;
        Some(DrawingDownload::at(
            drawing.drawing.clone(),
            chrono::Utc::now().timestamp_millis(),
        ))
    }

    /// Wait until every spawned auxiliary task has finished.
    pub async fn wait_for_auxiliary(&self) {
        let handles = std::mem::take(&mut *self.tasks.lock().await);
        for handle in handles {
            if let Err(error) = handle.await {
                warn!(error = %error, "auxiliary task did not complete");
            }
        }
    }

    #[must_use]
    pub fn stage(&self) -> StageStatus {
        self.recorder.status.borrow().clone()
    }

    /// Follow stage changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StageStatus> {
        self.recorder.status.subscribe()
    }

    #[must_use]
    pub fn design_summary(&self) -> Option<DesignSummary> {
        self.recorder.auxiliary().design_summary.clone()
    }

    /// Illustrations delivered so far, in completion order.
    #[must_use]
    pub fn illustrations(&self) -> Vec<Illustration> {
        self.recorder.auxiliary().illustrations.clone()
    }

    // The accessors below wait for a run in flight to finish.

    pub async fn code(&self) -> String {
        self.state.lock().await.code.full()
    }

    pub async fn drawing(&self) -> Option<GeneratedDrawing> {
        self.state.lock().await.drawing.clone()
    }

    pub async fn execution_log(&self) -> Vec<String> {
        self.state.lock().await.progress.log_lines().to_vec()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    /// The history sent to the assistant.
    pub async fn conversation(&self) -> Vec<ConversationTurn> {
        self.state.lock().await.conversation.history()
    }

    pub async fn transcript(&self) -> Vec<ConversationTurn> {
        self.state.lock().await.transcript.clone()
    }

    /// Spawned auxiliary tasks not yet awaited or reaped.
    pub async fn pending_auxiliary(&self) -> usize {
        self.tasks.lock().await.len()
    }

    async fn spawn_auxiliary(&self, analysis: &str) {
        {
            let mut auxiliary = self.recorder.auxiliary();
            auxiliary.design_summary = None;
            auxiliary.illustrations.clear();
        }

        let mut handles = Vec::new();

        if self.design_summary {
            let assistant = Arc::clone(&self.auxiliary_assistant);
            let session = Arc::clone(&self.session);
            let recorder = Arc::clone(&self.recorder);
            let analysis = analysis.to_string();

            handles.push(tokio::spawn(
                async move {
                    match generate_design_summary(assistant.as_ref(), session.params(), &analysis)
                        .await
                    {
                        Ok(summary) => recorder.on_event(PipelineEvent::DesignSummary(summary)),
                        Err(error) => warn!(error = %error, "design summary generation failed"),
                    }
                }
                .instrument(info_span!("cad_agent.design_summary")),
            ));
        }

        if let Some(illustrator) = &self.illustrator {
            let assistant = Arc::clone(&self.auxiliary_assistant);
            let illustrator = Arc::clone(illustrator);
            let session = Arc::clone(&self.session);
            let recorder = Arc::clone(&self.recorder);
            let analysis = analysis.to_string();

            handles.push(tokio::spawn(
                async move {
                    let views =
                        generate_view_prompts(assistant.as_ref(), session.params(), &analysis)
                            .await;
                    let batch = illustrate_all(illustrator, views, recorder.as_ref()).await;
                    info!(
                        delivered = batch.delivered.len(),
                        failed = batch.failed.len(),
                        "illustrations settled"
                    );
                }
                .instrument(info_span!("cad_agent.illustrations")),
            ));
        }

        let mut tasks = self.tasks.lock().await;
        tasks.retain(|handle| !handle.is_finished());
        tasks.extend(handles);
    }

    fn finish(
        state: &mut PipelineState,
        result: Result<RepairOutcome, PipelineError>,
    ) -> Result<GeneratedDrawing, PipelineError> {
        match result {
            Ok(outcome) => {
                let drawing = GeneratedDrawing {
                    drawing: outcome.drawing,
                    stats: outcome.stats,
                    attempts: outcome.retry.attempt,
                };
                state.drawing = Some(drawing.clone());
                Ok(drawing)
            }
            Err(error) => Err(Self::record_error(state, error)),
        }
    }

    /// Surface a failed run. The stage message of exhausted retries was
    /// already set by the session; everything else shows its message
    /// verbatim and is added to the transcript.
    fn record_error(state: &mut PipelineState, error: PipelineError) -> PipelineError {
        let message = error.to_string();
        state.error = Some(message.clone());

        if !matches!(error, PipelineError::ExhaustedRetries { .. }) {
            if state.progress.status().message != message {
                state.progress.set_stage(Stage::Error, message.clone());
            }
            state
                .transcript
                .push(ConversationTurn::assistant(format!("Error: {message}")));
        }
        warn!(error = %message, "pipeline run failed");
        error
    }
}
