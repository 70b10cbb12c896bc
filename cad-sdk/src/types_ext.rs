use crate::{
    AssistantRequest, ConversationTurn, EntityStats, ExecutionRequest, ExecutionResponse,
    ExecutionResult, IllustrationRequest, IllustrationResponse, Role, ServiceError,
    ServiceResult, ViewType,
};

const EXECUTION_PROVIDER: &str = "execution";
const ILLUSTRATION_PROVIDER: &str = "illustration";

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl AssistantRequest {
    pub fn new(user_message: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            system_prompt: system_prompt.into(),
            is_code_gen: false,
            conversation_history: Vec::new(),
            error_context: None,
        }
    }

    #[must_use]
    pub fn with_code_gen(mut self, is_code_gen: bool) -> Self {
        self.is_code_gen = is_code_gen;
        self
    }

    #[must_use]
    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.conversation_history = history;
        self
    }

    #[must_use]
    pub fn with_error_context(mut self, error: impl Into<String>) -> Self {
        self.error_context = Some(error.into());
        self
    }

    /// The user message as the model sees it. A present `error_context` is
    /// folded in as failure feedback ahead of the original request.
    #[must_use]
    pub fn effective_user_message(&self) -> String {
        match &self.error_context {
            Some(error) => format!(
                "Previous code failed with error:\n{error}\n\nPlease fix the code to address this \
                 error.\n\nOriginal request: {}",
                self.user_message
            ),
            None => self.user_message.clone(),
        }
    }

    #[must_use]
    pub fn temperature(&self) -> f64 {
        if self.is_code_gen {
            0.3
        } else {
            0.7
        }
    }

    #[must_use]
    pub fn max_tokens(&self) -> u32 {
        if self.is_code_gen {
            8000
        } else {
            4000
        }
    }

    /// Rejects requests the remote service cannot act on.
    pub fn validate(&self) -> ServiceResult<()> {
        if self.user_message.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "userMessage is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            max_retries: 1,
        }
    }

    pub fn validate(&self) -> ServiceResult<()> {
        if self.code.trim().is_empty() {
            return Err(ServiceError::InvalidInput("code is required".to_string()));
        }
        Ok(())
    }
}

impl ExecutionResponse {
    /// Interprets the reply. A failed run becomes [`ExecutionResult::Failed`]
    /// so the caller can repair it; a successful reply without a drawing is an
    /// unusable payload.
    pub fn into_result(self) -> ServiceResult<ExecutionResult> {
        if !self.success {
            return Ok(ExecutionResult::Failed {
                error: self
                    .error
                    .unwrap_or_else(|| "Unknown execution error".to_string()),
            });
        }

        let drawing = self.drawing.ok_or_else(|| {
            ServiceError::Invariant(
                EXECUTION_PROVIDER,
                "successful execution returned no drawing".to_string(),
            )
        })?;
        let stats = self.stats.unwrap_or(EntityStats {
            entity_count: 0,
            layer_count: 0,
            bounds: None,
        });

        Ok(ExecutionResult::Drawing { drawing, stats })
    }
}

impl ViewType {
    /// Every view, in the order illustrations are requested.
    pub const ALL: [Self; 5] = [
        Self::Isometric,
        Self::EngineeringSketch,
        Self::Front,
        Self::Top,
        Self::Rendering,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Isometric => "Isometric View",
            Self::EngineeringSketch => "Engineering Sketch",
            Self::Front => "Front View",
            Self::Top => "Top View",
            Self::Rendering => "3D Rendering",
        }
    }
}

impl IllustrationRequest {
    pub fn new(prompt: impl Into<String>, view_type: ViewType) -> Self {
        Self {
            prompt: prompt.into(),
            view_type,
        }
    }

    pub fn validate(&self) -> ServiceResult<()> {
        if self.prompt.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Prompt is required".to_string()));
        }
        Ok(())
    }
}

impl IllustrationResponse {
    /// Decoded image bytes of a successful response.
    pub fn decode_image(&self) -> ServiceResult<Vec<u8>> {
        use base64::Engine as _;

        let image = self.image.as_deref().filter(|_| self.success).ok_or_else(|| {
            ServiceError::Invariant(
                ILLUSTRATION_PROVIDER,
                self.error
                    .clone()
                    .unwrap_or_else(|| "No image generated".to_string()),
            )
        })?;

        base64::engine::general_purpose::STANDARD
            .decode(image)
            .map_err(|error| {
                ServiceError::Invariant(
                    ILLUSTRATION_PROVIDER,
                    format!("Invalid base64 image data: {error}"),
                )
            })
    }
}

impl std::fmt::Display for EntityStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} entities • {} layers", self.entity_count, self.layer_count)?;
        if let Some(bounds) = &self.bounds {
            write!(f, " {bounds}")?;
        }
        Ok(())
    }
}
