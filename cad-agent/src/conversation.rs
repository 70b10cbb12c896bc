use cad_sdk::{ConversationTurn, Role};

/// Ordered record of every exchange with the assistant service. Sent back
/// verbatim as history on each call; turns are only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role,
            content: content.into(),
        });
    }

    /// Record one request/response pair.
    pub fn push_exchange(&mut self, request: impl Into<String>, response: impl Into<String>) {
        self.push(Role::User, request);
        self.push(Role::Assistant, response);
    }

    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// A copy of the turns, as sent with the next request.
    #[must_use]
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.turns.clone()
    }
}
