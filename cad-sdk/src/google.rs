use crate::{
    client_utils, IllustrationRequest, IllustrationResponse, IllustrationService, ServiceError,
    ServiceResult,
};
use reqwest::{header::HeaderMap, Client};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

const PROVIDER: &str = "google";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL_ID: &str = "gemini-2.5-flash-image";

/// Illustrator calling the Gemini image generation model directly.
pub struct GoogleIllustrator {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
    headers: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct GoogleIllustratorOptions {
    pub api_key: String,
    pub base_url: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub client: Option<Client>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<Blob>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    data: String,
}

impl GoogleIllustrator {
    #[must_use]
    pub fn new(model_id: impl Into<String>, options: GoogleIllustratorOptions) -> Self {
        let GoogleIllustratorOptions {
            api_key,
            base_url,
            headers,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let client = client.unwrap_or_else(Client::new);
        let headers = headers.unwrap_or_default();

        Self {
            model_id: model_id.into(),
            api_key,
            base_url,
            client,
            headers,
        }
    }

    fn request_headers(&self) -> ServiceResult<HeaderMap> {
        client_utils::extra_headers(PROVIDER, &self.headers)
    }
}

#[async_trait::async_trait]
impl IllustrationService for GoogleIllustrator {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn illustrate(
        &self,
        request: IllustrationRequest,
    ) -> ServiceResult<IllustrationResponse> {
        crate::opentelemetry::trace_illustrate(self.provider(), request, |request| async move {
            request.validate()?;

            let url = format!(
                "{}/models/{}:generateContent?key={}",
                self.base_url, self.model_id, self.api_key
            );
            let params = json!({
                "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
            });

            let headers = self.request_headers()?;
            let response: GenerateContentResponse =
                client_utils::send_json(&self.client, &url, &params, headers).await?;

            let candidate = response
                .candidates
                .and_then(|c| c.into_iter().next())
                .ok_or_else(|| {
                    ServiceError::Invariant(PROVIDER, "No candidate in response".to_string())
                })?;

            let image = candidate
                .content
                .into_iter()
                .flat_map(|content| content.parts)
                .find_map(|part| part.inline_data)
                .map(|blob| blob.data);

            Ok(match image {
                Some(image) => IllustrationResponse {
                    success: true,
                    image: Some(image),
                    error: None,
                },
                None => IllustrationResponse {
                    success: false,
                    image: None,
                    error: Some("No image generated".to_string()),
                },
            })
        })
        .await
    }
}
