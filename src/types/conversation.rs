use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One turn of server-side conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// `user`, `assistant` or `tool`.
    pub role: String,

    /// Message text.
    pub content: String,

    /// When the server recorded the message.
    #[serde(with = "crate::utils::time")]
    pub timestamp: OffsetDateTime,
}

/// Success body of `GET /conversations/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationHistory {
    /// The conversation the history belongs to.
    pub conversation_id: String,

    /// Messages in the order the server recorded them, system turns excluded.
    pub messages: Vec<HistoryMessage>,
}

/// Summary row of `GET /conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Conversation identifier.
    pub id: String,

    /// Owner of the conversation.
    pub user_id: String,

    /// Number of stored messages.
    pub message_count: usize,

    /// When the conversation was created.
    #[serde(with = "crate::utils::time")]
    pub created_at: OffsetDateTime,

    /// When the conversation last changed.
    #[serde(with = "crate::utils::time")]
    pub updated_at: OffsetDateTime,
}

/// Success body of `GET /conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationList {
    /// The caller's conversations.
    pub conversations: Vec<ConversationSummary>,
}
