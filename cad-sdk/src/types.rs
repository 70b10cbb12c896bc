use serde::{Deserialize, Serialize};

/// The author of a conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single request or response exchanged with the assistant service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Input to the analysis/code-authoring service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    pub user_message: String,
    pub system_prompt: String,
    /// Selects the lower-temperature, higher-token-budget code generation
    /// mode.
    pub is_code_gen: bool,
    /// Prior turns, oldest first. Sent verbatim.
    pub conversation_history: Vec<ConversationTurn>,
    /// Raw error of a failed execution. When present, the service receives it
    /// folded into the effective user message as failure feedback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_context: Option<String>,
}

/// Token accounting reported by the assistant service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Output of the analysis/code-authoring service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct AssistantResponse {
    pub content: String,
    #[serde(default)]
    pub usage: TokenUsage,
}

/// Axis-aligned extents of a drawing in drawing units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Statistics about a drawing produced by the execution service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct EntityStats {
    #[serde(rename = "entities")]
    pub entity_count: u64,
    #[serde(rename = "layers")]
    pub layer_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

/// Input to the execution service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ExecutionRequest {
    pub code: String,
    /// Attempts the backend may make on its own. Pipelines that own their
    /// repair loop pass 1.
    pub max_retries: u32,
}

/// Raw reply of the execution service. Use
/// [`ExecutionResponse::into_result`] to interpret it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ExecutionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "dxf", default, skip_serializing_if = "Option::is_none")]
    pub drawing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<EntityStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
    /// Captured standard output of the drawing code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
}

/// Interpreted outcome of one execution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// The code ran and produced a drawing document.
    Drawing { drawing: String, stats: EntityStats },
    /// The code ran and failed. Recoverable through repair.
    Failed { error: String },
}

/// The fixed set of illustration views requested for every design.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum ViewType {
    Isometric,
    EngineeringSketch,
    Front,
    Top,
    Rendering,
}

/// Input to the illustration service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct IllustrationRequest {
    pub prompt: String,
    pub view_type: ViewType,
}

/// Output of the illustration service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct IllustrationResponse {
    #[serde(default)]
    pub success: bool,
    /// The base64-encoded image data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
