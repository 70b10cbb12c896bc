use crate::{code::extract_code, prompts, PipelineError, SessionParams};
use cad_sdk::{AssistantRequest, AssistantService};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub label: String,
    pub value: String,
}

/// Short write-up of a design shown next to the drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignSummary {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    pub rationale: String,
}

impl DesignSummary {
    /// Parse the JSON object in an assistant reply, fenced or bare.
    pub fn parse(reply: &str) -> Result<Self, PipelineError> {
        let json = extract_code(reply, "json");
        serde_json::from_str(json.trim()).map_err(|e| {
            PipelineError::Invariant(format!("Failed to parse design summary: {e}"))
        })
    }
}

/// Ask the assistant for a summary of the analyzed design. The exchange is
/// not recorded in any conversation.
pub async fn generate_design_summary(
    assistant: &dyn AssistantService,
    params: &SessionParams,
    analysis: &str,
) -> Result<DesignSummary, PipelineError> {
    let request = AssistantRequest::new(
        prompts::design_summary_prompt(analysis),
        &params.design_summary_system_prompt,
    );
    let response = assistant.complete(request).await?;
    DesignSummary::parse(&response.content)
}
