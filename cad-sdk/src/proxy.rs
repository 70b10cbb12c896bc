//! Clients for JSON proxy endpoints that front the three services, e.g. a
//! web backend exposing `/api/claude`, `/api/execute-dxf` and
//! `/api/generate-illustration`.

use crate::{
    client_utils, AssistantRequest, AssistantResponse, AssistantService, ExecutionRequest,
    ExecutionResponse, ExecutionService, IllustrationRequest, IllustrationResponse,
    IllustrationService, ServiceError, ServiceResult, TokenUsage,
};
use reqwest::{header::HeaderMap, Client};
use serde::Deserialize;
use std::collections::HashMap;

const PROVIDER: &str = "proxy";

#[derive(Clone, Default)]
pub struct ProxyOptions {
    /// Full URL of the endpoint, including its path.
    pub endpoint: String,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

struct ProxyEndpoint {
    endpoint: String,
    client: Client,
    headers: HashMap<String, String>,
}

impl ProxyEndpoint {
    fn new(options: ProxyOptions) -> Self {
        let ProxyOptions {
            endpoint,
            headers,
            client,
        } = options;

        Self {
            endpoint,
            client: client.unwrap_or_default(),
            headers: headers.unwrap_or_default(),
        }
    }

    fn request_headers(&self) -> ServiceResult<HeaderMap> {
        client_utils::extra_headers(PROVIDER, &self.headers)
    }
}

#[derive(Deserialize)]
struct AssistantReply {
    content: Option<String>,
    #[serde(default)]
    usage: TokenUsage,
    error: Option<String>,
}

/// Assistant behind a proxy that accepts [`AssistantRequest`] verbatim and
/// applies the error context and sampling settings server side.
pub struct ProxyAssistant {
    inner: ProxyEndpoint,
}

impl ProxyAssistant {
    #[must_use]
    pub fn new(options: ProxyOptions) -> Self {
        Self {
            inner: ProxyEndpoint::new(options),
        }
    }
}

#[async_trait::async_trait]
impl AssistantService for ProxyAssistant {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, request: AssistantRequest) -> ServiceResult<AssistantResponse> {
        crate::opentelemetry::trace_assistant(
            self.provider(),
            &self.inner.endpoint,
            request,
            |request| async move {
                request.validate()?;
                let reply: AssistantReply = client_utils::send_json_lenient(
                    &self.inner.client,
                    &self.inner.endpoint,
                    &request,
                    self.inner.request_headers()?,
                    self.provider(),
                )
                .await?;

                if let Some(error) = reply.error {
                    return Err(ServiceError::Remote(self.provider(), error));
                }
                let content = reply.content.ok_or_else(|| {
                    ServiceError::Invariant(self.provider(), "reply has no content".to_string())
                })?;

                Ok(AssistantResponse {
                    content,
                    usage: reply.usage,
                })
            },
        )
        .await
    }
}

/// Execution backend behind a proxy. Failed runs usually arrive with HTTP
/// 500 and a full [`ExecutionResponse`] body, which is returned as is.
pub struct ProxyExecutor {
    inner: ProxyEndpoint,
}

impl ProxyExecutor {
    #[must_use]
    pub fn new(options: ProxyOptions) -> Self {
        Self {
            inner: ProxyEndpoint::new(options),
        }
    }
}

#[async_trait::async_trait]
impl ExecutionService for ProxyExecutor {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn execute(&self, request: ExecutionRequest) -> ServiceResult<ExecutionResponse> {
        crate::opentelemetry::trace_execute(self.provider(), request, |request| async move {
            request.validate()?;
            client_utils::send_json_lenient(
                &self.inner.client,
                &self.inner.endpoint,
                &request,
                self.inner.request_headers()?,
                self.provider(),
            )
            .await
        })
        .await
    }
}

pub struct ProxyIllustrator {
    inner: ProxyEndpoint,
}

impl ProxyIllustrator {
    #[must_use]
    pub fn new(options: ProxyOptions) -> Self {
        Self {
            inner: ProxyEndpoint::new(options),
        }
    }
}

#[async_trait::async_trait]
impl IllustrationService for ProxyIllustrator {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn illustrate(
        &self,
        request: IllustrationRequest,
    ) -> ServiceResult<IllustrationResponse> {
        crate::opentelemetry::trace_illustrate(self.provider(), request, |request| async move {
            request.validate()?;
            client_utils::send_json_lenient(
                &self.inner.client,
                &self.inner.endpoint,
                &request,
                self.inner.request_headers()?,
                self.provider(),
            )
            .await
        })
        .await
    }
}
