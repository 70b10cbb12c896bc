use crate::{
    client_utils, AssistantRequest, AssistantResponse, AssistantService, Role, ServiceError,
    ServiceResult, TokenUsage,
};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const PROVIDER: &str = "anthropic";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL_ID: &str = "claude-sonnet-4-20250514";

/// Assistant talking to the Anthropic Messages API directly.
pub struct AnthropicAssistant {
    model_id: String,
    api_key: String,
    base_url: String,
    api_version: String,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct AnthropicAssistantOptions {
    pub base_url: Option<String>,
    pub api_key: String,
    pub api_version: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

#[derive(Serialize)]
struct CreateMessageParams<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: Vec<InputMessage>,
}

#[derive(Serialize)]
struct InputMessage {
    role: Role,
    content: String,
}

#[derive(Deserialize)]
struct Message {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicAssistant {
    #[must_use]
    pub fn new(model_id: impl Into<String>, mut options: AnthropicAssistantOptions) -> Self {
        let base_url = options
            .base_url
            .take()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let api_version = options
            .api_version
            .take()
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let client = options.client.take().unwrap_or_default();

        let headers = options.headers.unwrap_or_default();

        Self {
            model_id: model_id.into(),
            api_key: options.api_key,
            base_url,
            api_version,
            client,
            headers,
        }
    }

    fn request_headers(&self) -> ServiceResult<HeaderMap> {
        let mut headers = client_utils::extra_headers(PROVIDER, &self.headers)?;

        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key).map_err(|error| {
                ServiceError::InvalidInput(format!(
                    "Invalid Anthropic API key header value: {error}"
                ))
            })?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(&self.api_version).map_err(|error| {
                ServiceError::InvalidInput(format!(
                    "Invalid Anthropic version header value: {error}"
                ))
            })?,
        );

        Ok(headers)
    }
}

fn convert_to_messages(request: &AssistantRequest) -> Vec<InputMessage> {
    request
        .conversation_history
        .iter()
        .map(|turn| InputMessage {
            role: turn.role,
            content: turn.content.clone(),
        })
        .chain(std::iter::once(InputMessage {
            role: Role::User,
            content: request.effective_user_message(),
        }))
        .collect()
}

#[async_trait::async_trait]
impl AssistantService for AnthropicAssistant {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, request: AssistantRequest) -> ServiceResult<AssistantResponse> {
        crate::opentelemetry::trace_assistant(
            self.provider(),
            &self.model_id,
            request,
            |request| async move {
                request.validate()?;

                let payload = CreateMessageParams {
                    model: &self.model_id,
                    max_tokens: request.max_tokens(),
                    temperature: request.temperature(),
                    system: &request.system_prompt,
                    messages: convert_to_messages(&request),
                };

                let headers = self.request_headers()?;

                let response: Message = client_utils::send_json(
                    &self.client,
                    &format!("{}/v1/messages", self.base_url),
                    &payload,
                    headers,
                )
                .await?;

                let content = response
                    .content
                    .into_iter()
                    .find_map(|block| match block {
                        ContentBlock::Text { text } => Some(text),
                        ContentBlock::Other => None,
                    })
                    .ok_or_else(|| {
                        ServiceError::Invariant(PROVIDER, "No text content in response".to_string())
                    })?;

                Ok(AssistantResponse {
                    content,
                    usage: TokenUsage {
                        input_tokens: response.usage.input_tokens,
                        output_tokens: response.usage.output_tokens,
                    },
                })
            },
        )
        .await
    }
}
