use crate::{illustration::Illustration, summary::DesignSummary};
use cad_sdk::ViewType;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tokio::sync::mpsc::UnboundedSender;

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Idle,
    Analyzing,
    Generating,
    Executing,
    Fixing,
    Success,
    Error,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Analyzing => "analyzing",
            Self::Generating => "generating",
            Self::Executing => "executing",
            Self::Fixing => "fixing",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage together with the message shown for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStatus {
    pub stage: Stage,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Stage(StageStatus),
    /// A line appended to the execution log.
    Log(String),
    DesignSummary(DesignSummary),
    /// One view finished rendering. Emitted as soon as that view completes.
    Illustration(Illustration),
    IllustrationFailed { view_type: ViewType, error: String },
    /// Every illustration request has settled.
    IllustrationsSettled { delivered: usize, failed: usize },
}

/// Receives pipeline events as they happen.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: PipelineEvent);
}

impl PipelineObserver for () {
    fn on_event(&self, _event: PipelineEvent) {}
}

impl PipelineObserver for UnboundedSender<PipelineEvent> {
    fn on_event(&self, event: PipelineEvent) {
        // A dropped receiver only means nobody is listening anymore.
        let _ = self.send(event);
    }
}

/// Stage and execution log of a run, forwarded to an observer as they change.
pub struct Progress {
    observer: Arc<dyn PipelineObserver>,
    status: StageStatus,
    log: Vec<String>,
}

impl Progress {
    pub fn new(observer: Arc<dyn PipelineObserver>) -> Self {
        Self {
            observer,
            status: StageStatus::default(),
            log: Vec::new(),
        }
    }

    pub fn set_stage(&mut self, stage: Stage, message: impl Into<String>) {
        self.status = StageStatus {
            stage,
            message: message.into(),
        };
        tracing::debug!(stage = %stage, message = %self.status.message, "stage changed");
        self.observer
            .on_event(PipelineEvent::Stage(self.status.clone()));
    }

    /// Append a line to the execution log.
    pub fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        self.log.push(line.clone());
        self.observer.on_event(PipelineEvent::Log(line));
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.status.stage
    }

    #[must_use]
    pub fn status(&self) -> &StageStatus {
        &self.status
    }

    #[must_use]
    pub fn log_lines(&self) -> &[String] {
        &self.log
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(Arc::new(()))
    }
}
