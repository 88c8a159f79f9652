//! Chat application module for interactive conversations with the
//! orchestrator.
//!
//! The REPL itself lives in the `toolchat` binary; this module holds the
//! pieces it is assembled from:
//!
//! - [`config`]: CLI argument parsing and layered configuration
//! - [`commands`]: Slash command parsing

mod commands;
mod config;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, Input, help_text, parse_command, parse_input};
pub use config::{BASE_URL_ENV, ChatArgs, ChatConfig, TOKEN_ENV, parse_domain_list};
