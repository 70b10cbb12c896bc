use crate::{prompts, GenerationSession};
use cad_sdk::{AssistantService, ExecutionService};
use std::sync::Arc;

/// Parameters of a generation session.
/// # Default Values
/// - `analysis_system_prompt`: [`prompts::ANALYSIS_SYSTEM_PROMPT`]
/// - `code_gen_system_prompt`: [`prompts::CODE_GEN_SYSTEM_PROMPT`]
/// - `design_summary_system_prompt`: [`prompts::DESIGN_SUMMARY_SYSTEM_PROMPT`]
/// - `image_prompts_system_prompt`: [`prompts::IMAGE_PROMPTS_SYSTEM_PROMPT`]
/// - `preamble`: [`prompts::DRAWING_PREAMBLE`]
/// - `code_language`: `"python"`
/// - `clarification_markers`: [`prompts::CLARIFICATION_MARKERS`]
/// - `max_attempts`: 3
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub analysis_system_prompt: String,
    pub code_gen_system_prompt: String,
    pub design_summary_system_prompt: String,
    pub image_prompts_system_prompt: String,
    /// Fixed code every drawing starts with. Never sent to the assistant for
    /// authoring and never changed by repairs.
    pub preamble: Arc<str>,
    /// Tag of the fenced block extracted from authoring replies.
    pub code_language: String,
    /// Lowercase phrases that mark an analysis as a clarification request.
    pub clarification_markers: Vec<String>,
    /// Execution attempts per run, including the first one.
    pub max_attempts: usize,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            analysis_system_prompt: prompts::ANALYSIS_SYSTEM_PROMPT.to_string(),
            code_gen_system_prompt: prompts::CODE_GEN_SYSTEM_PROMPT.to_string(),
            design_summary_system_prompt: prompts::DESIGN_SUMMARY_SYSTEM_PROMPT.to_string(),
            image_prompts_system_prompt: prompts::IMAGE_PROMPTS_SYSTEM_PROMPT.to_string(),
            preamble: Arc::from(prompts::DRAWING_PREAMBLE),
            code_language: "python".to_string(),
            clarification_markers: prompts::CLARIFICATION_MARKERS
                .iter()
                .map(ToString::to_string)
                .collect(),
            max_attempts: 3,
        }
    }
}

impl SessionParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn analysis_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.analysis_system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn code_gen_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.code_gen_system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn design_summary_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.design_summary_system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn image_prompts_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.image_prompts_system_prompt = prompt.into();
        self
    }

    /// Set the code every drawing starts with.
    #[must_use]
    pub fn preamble(mut self, preamble: impl Into<Arc<str>>) -> Self {
        self.preamble = preamble.into();
        self
    }

    #[must_use]
    pub fn code_language(mut self, language: impl Into<String>) -> Self {
        self.code_language = language.into();
        self
    }

    /// Set the clarification markers. Matching is case-insensitive.
    #[must_use]
    pub fn clarification_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clarification_markers = markers
            .into_iter()
            .map(|marker| marker.into().to_lowercase())
            .collect();
        self
    }

    /// Set the number of execution attempts. Values below 1 are raised to 1.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn build(
        self,
        assistant: Arc<dyn AssistantService>,
        executor: Arc<dyn ExecutionService>,
    ) -> GenerationSession {
        GenerationSession::new(assistant, executor, self)
    }
}
