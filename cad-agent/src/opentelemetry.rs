use crate::{GeneratedDrawing, PipelineError, SubmitOutcome};
use opentelemetry::trace::Status;
use std::{error::Error, future::Future};
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

#[derive(Clone, Copy)]
pub enum PipelineSpanMethod {
    Submit,
    Regenerate,
}

impl PipelineSpanMethod {
    fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Regenerate => "regenerate",
        }
    }
}

/// Values recorded on a pipeline span when a run finishes.
pub trait PipelineSpanRecord {
    fn record(&self, span: &Span);
}

impl PipelineSpanRecord for GeneratedDrawing {
    fn record(&self, span: &Span) {
        span.set_attribute("cad.attempts", self.attempts as i64);
        span.set_attribute("cad.entities", self.stats.entity_count as i64);
        span.set_attribute("cad.layers", self.stats.layer_count as i64);
    }
}

impl PipelineSpanRecord for SubmitOutcome {
    fn record(&self, span: &Span) {
        match self {
            Self::NeedsClarification { .. } => {
                span.set_attribute("cad.clarification", true);
            }
            Self::Drawing(drawing) => drawing.record(span),
        }
    }
}

pub struct PipelineSpan {
    span: Span,
}

impl PipelineSpan {
    pub fn new(method: PipelineSpanMethod) -> Self {
        let span = match method {
            PipelineSpanMethod::Submit => info_span!("cad_agent.submit"),
            PipelineSpanMethod::Regenerate => info_span!("cad_agent.regenerate"),
        };
        span.set_attribute("gen_ai.operation.name", "invoke_agent");
        span.set_attribute("cad_agent.method", method.as_str());

        Self { span }
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }

    pub fn on_error(&self, error: &(dyn Error + 'static)) {
        if let Some(PipelineError::ExhaustedRetries { attempts, .. }) =
            error.downcast_ref::<PipelineError>()
        {
            self.span.set_attribute("cad.attempts", *attempts as i64);
        }
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }
}

pub async fn trace_pipeline<T, Fut>(
    method: PipelineSpanMethod,
    future: Fut,
) -> Result<T, PipelineError>
where
    T: PipelineSpanRecord,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    let span = PipelineSpan::new(method);
    let result = future.instrument(span.span()).await;

    match &result {
        Ok(output) => output.record(&span.span),
        Err(error) => span.on_error(error),
    }

    result
}
