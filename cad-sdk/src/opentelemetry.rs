use crate::{
    AssistantRequest, AssistantResponse, ExecutionRequest, ExecutionResponse,
    IllustrationRequest, IllustrationResponse, ServiceResult, TokenUsage,
};
use opentelemetry::trace::Status;
use std::time::Instant;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

pub struct ServiceSpan {
    span: Span,
    usage: Option<TokenUsage>,
    start_time: Instant,
}

impl ServiceSpan {
    fn assistant(provider: &str, model_id: &str, request: &AssistantRequest) -> Self {
        let span = info_span!("cad_sdk.assistant");
        span.set_attribute("gen_ai.operation.name", "chat");
        span.set_attribute("gen_ai.provider.name", provider.to_string());
        span.set_attribute("gen_ai.request.model", model_id.to_string());
        span.set_attribute("gen_ai.request.max_tokens", i64::from(request.max_tokens()));
        span.set_attribute("gen_ai.request.temperature", request.temperature());
        span.set_attribute("cad.code_gen", request.is_code_gen);
        span.set_attribute("cad.repair", request.error_context.is_some());
        Self::from_span(span)
    }

    fn execute(provider: &str, request: &ExecutionRequest) -> Self {
        let span = info_span!("cad_sdk.execute");
        span.set_attribute("cad.execution.provider", provider.to_string());
        span.set_attribute("cad.execution.code_length", request.code.len() as i64);
        Self::from_span(span)
    }

    fn illustrate(provider: &str, request: &IllustrationRequest) -> Self {
        let span = info_span!("cad_sdk.illustrate");
        span.set_attribute("gen_ai.operation.name", "generate_content");
        span.set_attribute("gen_ai.provider.name", provider.to_string());
        span.set_attribute("cad.view_type", request.view_type.label());
        Self::from_span(span)
    }

    fn from_span(span: Span) -> Self {
        Self {
            span,
            usage: None,
            start_time: Instant::now(),
        }
    }

    fn span(&self) -> Span {
        self.span.clone()
    }

    pub async fn instrument_future<F>(&self, future: F) -> F::Output
    where
        F: std::future::Future,
    {
        future.instrument(self.span()).await
    }

    pub fn on_usage(&mut self, usage: &TokenUsage) {
        self.usage = Some(*usage);
    }

    pub fn on_remote_failure(&mut self, message: &str) {
        self.span.set_attribute("cad.remote_error", message.to_string());
    }

    pub fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_end(&mut self) {
        if let Some(usage) = self.usage.take() {
            self.span
                .set_attribute("gen_ai.usage.input_tokens", i64::from(usage.input_tokens));
            self.span
                .set_attribute("gen_ai.usage.output_tokens", i64::from(usage.output_tokens));
        }
        self.span
            .set_attribute("cad.duration_seconds", self.start_time.elapsed().as_secs_f64());
    }
}

pub async fn trace_assistant<F, Fut>(
    provider: &str,
    model_id: &str,
    request: AssistantRequest,
    f: F,
) -> ServiceResult<AssistantResponse>
where
    F: FnOnce(AssistantRequest) -> Fut,
    Fut: std::future::Future<Output = ServiceResult<AssistantResponse>>,
{
    let mut span = ServiceSpan::assistant(provider, model_id, &request);
    let result = span.instrument_future(f(request)).await;

    match &result {
        Ok(response) => {
            tracing::debug!(
                provider,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "assistant replied"
            );
            span.on_usage(&response.usage);
        }
        Err(error) => span.on_error(error),
    }

    span.on_end();
    result
}

pub async fn trace_execute<F, Fut>(
    provider: &str,
    request: ExecutionRequest,
    f: F,
) -> ServiceResult<ExecutionResponse>
where
    F: FnOnce(ExecutionRequest) -> Fut,
    Fut: std::future::Future<Output = ServiceResult<ExecutionResponse>>,
{
    let mut span = ServiceSpan::execute(provider, &request);
    let result = span.instrument_future(f(request)).await;

    match &result {
        Ok(response) => {
            tracing::debug!(provider, success = response.success, "execution service replied");
            span.span.set_attribute("cad.execution.success", response.success);
            if let Some(error) = &response.error {
                span.on_remote_failure(error);
            }
        }
        Err(error) => span.on_error(error),
    }

    span.on_end();
    result
}

pub async fn trace_illustrate<F, Fut>(
    provider: &str,
    request: IllustrationRequest,
    f: F,
) -> ServiceResult<IllustrationResponse>
where
    F: FnOnce(IllustrationRequest) -> Fut,
    Fut: std::future::Future<Output = ServiceResult<IllustrationResponse>>,
{
    let mut span = ServiceSpan::illustrate(provider, &request);
    let result = span.instrument_future(f(request)).await;

    match &result {
        Ok(response) => {
            tracing::debug!(provider, success = response.success, "illustration service replied");
            if let Some(error) = &response.error {
                span.on_remote_failure(error);
            }
        }
        Err(error) => span.on_error(error),
    }

    span.on_end();
    result
}
