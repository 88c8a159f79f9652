//! Wire types for the orchestrator API.

mod chat;
mod conversation;
mod error_body;
mod health;
mod tool;

pub use chat::{ChatRequest, ChatResponse};
pub use conversation::{ConversationHistory, ConversationList, ConversationSummary, HistoryMessage};
pub use error_body::ErrorBody;
pub use health::HealthStatus;
pub use tool::{ToolDescriptor, ToolListResponse};
