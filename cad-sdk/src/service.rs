use crate::{
    AssistantRequest, AssistantResponse, ExecutionRequest, ExecutionResponse,
    IllustrationRequest, IllustrationResponse, ServiceResult,
};

/// The analysis/code-authoring service.
#[async_trait::async_trait]
pub trait AssistantService: Send + Sync {
    fn provider(&self) -> &'static str;
    async fn complete(&self, request: AssistantRequest) -> ServiceResult<AssistantResponse>;
}

/// The sandboxed backend that runs drawing code and returns a drawing
/// document.
#[async_trait::async_trait]
pub trait ExecutionService: Send + Sync {
    fn provider(&self) -> &'static str;
    /// Execute drawing code. A failed run is reported through the response
    /// body, not as an `Err`; `Err` means the service itself was unreachable
    /// or answered with something unusable.
    async fn execute(&self, request: ExecutionRequest) -> ServiceResult<ExecutionResponse>;
}

/// The service producing concept illustrations of a design.
#[async_trait::async_trait]
pub trait IllustrationService: Send + Sync {
    fn provider(&self) -> &'static str;
    async fn illustrate(&self, request: IllustrationRequest)
        -> ServiceResult<IllustrationResponse>;
}
