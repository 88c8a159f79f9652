//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the session and query the orchestrator
//! without sending a chat message.

/// A parsed chat command.
///
/// These commands are never sent to the orchestrator as chat text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Start a new conversation.
    New,

    /// Toggle one domain in the active filter.
    ToggleDomain(String),

    /// List available domains and which are selected.
    ListDomains,

    /// Clear the domain filter.
    AllDomains,

    /// List tools, optionally for a single domain.
    Tools(Option<String>),

    /// Show server-side history.  `None` means the current conversation.
    History(Option<String>),

    /// List conversations on the server.
    Conversations,

    /// Delete a conversation on the server.
    Delete(String),

    /// Query orchestrator health.
    Health,

    /// Show local session state.
    Status,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use toolchat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/domain hr").is_some());
/// assert!(parse_command("How many vacation days do I have?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "new" | "reset" => ChatCommand::New,
        "domain" => match argument {
            Some(domain) => ChatCommand::ToggleDomain(domain.to_string()),
            None => ChatCommand::Invalid("/domain requires a domain name".to_string()),
        },
        "domains" => ChatCommand::ListDomains,
        "all" => ChatCommand::AllDomains,
        "tools" => ChatCommand::Tools(argument.map(str::to_string)),
        "history" => ChatCommand::History(argument.map(str::to_string)),
        "conversations" | "convs" => ChatCommand::Conversations,
        "delete" => match argument {
            Some(id) => ChatCommand::Delete(id.to_string()),
            None => ChatCommand::Invalid("/delete requires a conversation id".to_string()),
        },
        "health" => ChatCommand::Health,
        "status" => ChatCommand::Status,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<'a> {
    /// A slash command.
    Command(ChatCommand),
    /// Chat text, exactly as typed.
    Message(&'a str),
}

/// Classifies a raw input line.  Returns `None` for a blank line.
///
/// Whitespace is ignored for command detection, but a message keeps the
/// surrounding whitespace the user typed.
pub fn parse_input(line: &str) -> Option<Input<'_>> {
    if line.trim().is_empty() {
        return None;
    }
    Some(match parse_command(line) {
        Some(command) => Input::Command(command),
        None => Input::Message(line),
    })
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /new                   Start a new conversation
  /domain <name>         Toggle a tool domain in the filter
  /domains               List domains and the current selection
  /all                   Use tools from all domains
  /tools [domain]        List available tools
  /history [id]          Show server history (default: current conversation)
  /conversations         List your conversations
  /delete <id>           Delete a conversation
  /health                Check orchestrator health
  /status                Show session status
  /help                  Show this help message
  /quit                  Exit the chat"#
}
