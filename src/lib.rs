// Public modules
pub mod chat;
pub mod client;
pub mod domains;
pub mod error;
pub mod render;
pub mod session;
pub mod types;
pub mod utils;

mod observability;

// Re-exports
pub use client::Client;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use session::{
    ChatBackend, DomainFilter, Message, PENDING_MESSAGE_ID, Role, SessionController,
    SessionState, SubmitOutcome,
};
pub use types::*;
