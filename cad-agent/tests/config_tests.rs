use cad_agent::{AssistantConfig, ConfigError, IllustrationConfig, PipelineConfig};
use std::collections::HashMap;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn resolves_proxy_endpoints_with_defaults() {
    let config = PipelineConfig::from_lookup(lookup(&[
        ("CAD_ASSISTANT_ENDPOINT", "http://localhost:3000/api/claude"),
        ("LAMBDA_API_ENDPOINT", "https://lambda.example.com/execute"),
        ("CAD_ILLUSTRATION_ENDPOINT", "http://localhost:3000/api/generate-illustration"),
    ]))
    .expect("config");

    assert_eq!(
        config,
        PipelineConfig {
            assistant: AssistantConfig::Proxy {
                endpoint: "http://localhost:3000/api/claude".to_string(),
            },
            execution_endpoint: "https://lambda.example.com/execute".to_string(),
            illustration: Some(IllustrationConfig::Proxy {
                endpoint: "http://localhost:3000/api/generate-illustration".to_string(),
            }),
            max_attempts: 3,
            design_summary: true,
            illustrations: true,
            request_timeout_secs: None,
            preview_font: None,
        }
    );
}

#[test]
fn falls_back_to_provider_keys() {
    let config = PipelineConfig::from_lookup(lookup(&[
        ("CLAUDE_API_KEY", "sk-ant"),
        ("CAD_EXECUTION_ENDPOINT", "http://exec"),
        ("GOOGLE_API_KEY", "g-key"),
        ("CAD_MAX_ATTEMPTS", "5"),
        ("CAD_ILLUSTRATIONS", "off"),
        ("CAD_REQUEST_TIMEOUT_SECS", "90"),
    ]))
    .expect("config");

    assert_eq!(
        config.assistant,
        AssistantConfig::Anthropic {
            api_key: "sk-ant".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
        }
    );
    assert_eq!(
        config.illustration,
        Some(IllustrationConfig::Google {
            api_key: "g-key".to_string(),
            model: "gemini-2.5-flash-image".to_string(),
        })
    );
    assert_eq!(config.max_attempts, 5);
    assert!(!config.illustrations);
    assert_eq!(config.request_timeout_secs, Some(90));
    assert_eq!(config.session_params().max_attempts, 5);

    let client = config.http_client().expect("client");
    assert!(config.illustration_service(&client).is_none());
}

#[test]
fn missing_and_invalid_values_are_reported() {
    let missing = PipelineConfig::from_lookup(lookup(&[("CAD_EXECUTION_ENDPOINT", "http://exec")]))
        .expect_err("no assistant");
    assert!(matches!(missing, ConfigError::Missing(_)));

    let blank = PipelineConfig::from_lookup(lookup(&[
        ("CAD_ASSISTANT_ENDPOINT", "http://assistant"),
        ("CAD_EXECUTION_ENDPOINT", "   "),
    ]))
    .expect_err("blank execution endpoint");
    assert!(matches!(blank, ConfigError::Missing("CAD_EXECUTION_ENDPOINT")));

    let invalid = PipelineConfig::from_lookup(lookup(&[
        ("CAD_ASSISTANT_ENDPOINT", "http://assistant"),
        ("CAD_EXECUTION_ENDPOINT", "http://exec"),
        ("CAD_MAX_ATTEMPTS", "0"),
    ]))
    .expect_err("zero attempts");
    assert!(matches!(
        invalid,
        ConfigError::Invalid {
            name: "CAD_MAX_ATTEMPTS",
            ..
        }
    ));
}

#[test]
fn missing_preview_font_is_an_io_error() {
    let mut config = PipelineConfig::from_lookup(lookup(&[
        ("CAD_ASSISTANT_ENDPOINT", "http://assistant"),
        ("CAD_EXECUTION_ENDPOINT", "http://exec"),
    ]))
    .expect("config");
    assert_eq!(config.load_preview_font().expect("no font"), None);

    config.preview_font = Some("/nonexistent/font.ttf".into());
    assert!(matches!(
        config.load_preview_font(),
        Err(ConfigError::Io { .. })
    ));
}
