use crate::{ConfigError, GenerationSession, Orchestrator, PipelineObserver, SessionParams};
use cad_sdk::{
    anthropic::{self, AnthropicAssistant, AnthropicAssistantOptions},
    google::{self, GoogleIllustrator, GoogleIllustratorOptions},
    proxy::{ProxyAssistant, ProxyExecutor, ProxyIllustrator, ProxyOptions},
    AssistantService, ExecutionService, IllustrationService,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, sync::Arc, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssistantConfig {
    /// A JSON endpoint accepting assistant requests verbatim.
    Proxy { endpoint: String },
    Anthropic { api_key: String, model: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IllustrationConfig {
    Proxy { endpoint: String },
    Google { api_key: String, model: String },
}

/// Where the services live and how the pipeline runs.
///
/// Resolved from the environment by [`PipelineConfig::from_env`]:
/// - `CAD_ASSISTANT_ENDPOINT`, or `ANTHROPIC_API_KEY` / `CLAUDE_API_KEY` with
///   an optional `CAD_ASSISTANT_MODEL`
/// - `CAD_EXECUTION_ENDPOINT` or `LAMBDA_API_ENDPOINT`
/// - `CAD_ILLUSTRATION_ENDPOINT`, or `GEMINI_API_KEY` / `GOOGLE_API_KEY`
///   with an optional `CAD_ILLUSTRATION_MODEL`
/// - `CAD_MAX_ATTEMPTS` (default 3)
/// - `CAD_DESIGN_SUMMARY`, `CAD_ILLUSTRATIONS` (default true)
/// - `CAD_REQUEST_TIMEOUT_SECS`
/// - `CAD_PREVIEW_FONT`: path of a TrueType font for previews
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub assistant: AssistantConfig,
    pub execution_endpoint: String,
    pub illustration: Option<IllustrationConfig>,
    pub max_attempts: usize,
    pub design_summary: bool,
    pub illustrations: bool,
    pub request_timeout_secs: Option<u64>,
    pub preview_font: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve the configuration from any variable source. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let first = |names: &[&str]| names.iter().find_map(|&name| var(name));

        let assistant = if let Some(endpoint) = var("CAD_ASSISTANT_ENDPOINT") {
            AssistantConfig::Proxy { endpoint }
        } else if let Some(api_key) = first(&["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"]) {
            AssistantConfig::Anthropic {
                api_key,
                model: var("CAD_ASSISTANT_MODEL")
                    .unwrap_or_else(|| anthropic::DEFAULT_MODEL_ID.to_string()),
            }
        } else {
            return Err(ConfigError::Missing(
                "CAD_ASSISTANT_ENDPOINT or ANTHROPIC_API_KEY",
            ));
        };

        let execution_endpoint = first(&["CAD_EXECUTION_ENDPOINT", "LAMBDA_API_ENDPOINT"])
            .ok_or(ConfigError::Missing("CAD_EXECUTION_ENDPOINT"))?;

        let illustration = if let Some(endpoint) = var("CAD_ILLUSTRATION_ENDPOINT") {
            Some(IllustrationConfig::Proxy { endpoint })
        } else {
            first(&["GEMINI_API_KEY", "GOOGLE_API_KEY"]).map(|api_key| IllustrationConfig::Google {
                api_key,
                model: var("CAD_ILLUSTRATION_MODEL")
                    .unwrap_or_else(|| google::DEFAULT_MODEL_ID.to_string()),
            })
        };

        let max_attempts = match var("CAD_MAX_ATTEMPTS") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(attempts) if attempts > 0 => attempts,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "CAD_MAX_ATTEMPTS",
                        message: format!("expected a positive integer, got {value:?}"),
                    })
                }
            },
            None => 3,
        };

        let request_timeout_secs = var("CAD_REQUEST_TIMEOUT_SECS")
            .map(|value| {
                value.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    name: "CAD_REQUEST_TIMEOUT_SECS",
                    message: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            assistant,
            execution_endpoint,
            illustration,
            max_attempts,
            design_summary: parse_flag("CAD_DESIGN_SUMMARY", var("CAD_DESIGN_SUMMARY"))?,
            illustrations: parse_flag("CAD_ILLUSTRATIONS", var("CAD_ILLUSTRATIONS"))?,
            request_timeout_secs,
            preview_font: var("CAD_PREVIEW_FONT").map(PathBuf::from),
        })
    }

    pub fn http_client(&self) -> Result<Client, ConfigError> {
        let mut builder = Client::builder();
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }

    #[must_use]
    pub fn assistant_service(&self, client: &Client) -> Arc<dyn AssistantService> {
        match &self.assistant {
            AssistantConfig::Proxy { endpoint } => {
                Arc::new(ProxyAssistant::new(proxy_options(endpoint, client)))
            }
            AssistantConfig::Anthropic { api_key, model } => Arc::new(AnthropicAssistant::new(
                model.clone(),
                AnthropicAssistantOptions {
                    api_key: api_key.clone(),
                    client: Some(client.clone()),
                    ..Default::default()
                },
            )),
        }
    }

    #[must_use]
    pub fn execution_service(&self, client: &Client) -> Arc<dyn ExecutionService> {
        Arc::new(ProxyExecutor::new(proxy_options(
            &self.execution_endpoint,
            client,
        )))
    }

    /// `None` when illustrations are disabled or no illustrator is configured.
    #[must_use]
    pub fn illustration_service(&self, client: &Client) -> Option<Arc<dyn IllustrationService>> {
        if !self.illustrations {
            return None;
        }
        let service: Arc<dyn IllustrationService> = match self.illustration.as_ref()? {
            IllustrationConfig::Proxy { endpoint } => {
                Arc::new(ProxyIllustrator::new(proxy_options(endpoint, client)))
            }
            IllustrationConfig::Google { api_key, model } => Arc::new(GoogleIllustrator::new(
                model.clone(),
                GoogleIllustratorOptions {
                    api_key: api_key.clone(),
                    client: Some(client.clone()),
                    ..Default::default()
                },
            )),
        };
        Some(service)
    }

    #[must_use]
    pub fn session_params(&self) -> SessionParams {
        SessionParams::default().max_attempts(self.max_attempts)
    }

    /// Wire every configured service into an orchestrator sharing one HTTP
    /// client.
    pub fn build_orchestrator(
        &self,
        observer: Arc<dyn PipelineObserver>,
    ) -> Result<Orchestrator, ConfigError> {
        let client = self.http_client()?;
        let session = GenerationSession::new(
            self.assistant_service(&client),
            self.execution_service(&client),
            self.session_params(),
        );

        let mut orchestrator =
            Orchestrator::new(session, observer).with_design_summary(self.design_summary);
        if let Some(illustrator) = self.illustration_service(&client) {
            orchestrator = orchestrator.with_illustrator(illustrator);
        }
        Ok(orchestrator)
    }

    /// Read the preview font, if one is configured.
    pub fn load_preview_font(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        let Some(path) = &self.preview_font else {
            return Ok(None);
        };
        std::fs::read(path)
            .map(Some)
            .map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })
    }
}

fn proxy_options(endpoint: &str, client: &Client) -> ProxyOptions {
    ProxyOptions {
        endpoint: endpoint.to_string(),
        client: Some(client.clone()),
        ..Default::default()
    }
}

fn parse_flag(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(true);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}
