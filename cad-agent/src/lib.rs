mod code;
mod config;
mod conversation;
mod errors;
pub mod illustration;
mod opentelemetry;
mod orchestrator;
mod params;
pub mod prompts;
mod session;
mod stage;
pub mod summary;

pub use code::{extract_code, DrawingCode};
pub use config::{AssistantConfig, IllustrationConfig, PipelineConfig};
pub use conversation::Conversation;
pub use errors::{ConfigError, PipelineError};
pub use orchestrator::{
    DrawingDownload, GeneratedDrawing, Orchestrator, SubmitOutcome, DXF_CONTENT_TYPE,
};
pub use params::SessionParams;
pub use session::{ExecutionFailure, GenerationSession, RepairOutcome, RetryState};
pub use stage::{PipelineEvent, PipelineObserver, Progress, Stage, StageStatus};
pub use illustration::{Illustration, IllustrationBatch, ViewPrompt};
pub use summary::{DesignSummary, Dimension};
