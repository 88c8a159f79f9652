use serde::{Deserialize, Serialize};

/// Body of `POST /chat`.
///
/// Absent optional fields are omitted from the JSON rather than sent as
/// `null`, so the orchestrator sees exactly what the caller set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message text.
    pub message: String,

    /// The conversation to continue, if one has been assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,

    /// Tool domains the assistant may use; `None` allows every domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
}

impl ChatRequest {
    /// Create a request that starts a new conversation with no domain filter.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
            domains: None,
        }
    }

    /// Continue the given conversation.
    pub fn with_conversation_id(mut self, conversation_id: Option<String>) -> Self {
        self.conversation_id = conversation_id;
        self
    }

    /// Restrict the request to the given domains.
    ///
    /// An empty list is normalized to `None`.
    pub fn with_domains(mut self, domains: Option<Vec<String>>) -> Self {
        self.domains = domains.filter(|d| !d.is_empty());
        self
    }
}

/// Success body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The conversation this turn belongs to.
    pub conversation_id: String,

    /// The assistant's final answer.
    pub response: String,

    /// Server-side identifier for this turn.
    pub request_id: String,
}
