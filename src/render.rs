//! Output rendering for the chat REPL.
//!
//! The renderer is passive: it is handed messages from the session and
//! writes them out.  It never feeds anything back into the session.

use std::io::{self, Stdout, Write};

use crate::session::{Message, Role};

/// ANSI escape code for dim text (used for the pending placeholder).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for the pending placeholder).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for assistant labels).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for user labels).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Text shown in place of an answer that has not arrived yet.
pub const PENDING_TEXT: &str = "(thinking...)";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print one conversation turn under a role label.
    fn print_turn(&mut self, role: &str, content: &str);

    /// Print the placeholder for an in-flight answer.
    fn print_pending(&mut self);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print a session message.
    fn print_message(&mut self, message: &Message) {
        if message.pending {
            self.print_pending();
        } else {
            self.print_turn(role_label(message.role), &message.content);
        }
    }
}

/// Display label for a role.
pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    }
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer that writes to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self { out, use_color }
    }

    /// Consumes the renderer and returns its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_turn(&mut self, role: &str, content: &str) {
        let color = if role == role_label(Role::User) {
            ANSI_GREEN
        } else {
            ANSI_CYAN
        };
        let label = self.styled(color, &format!("{role}:"));
        self.write_line(&label);
        for line in content.lines() {
            self.write_line(&format!("  {line}"));
        }
        self.write_line("");
    }

    fn print_pending(&mut self) {
        let text = if self.use_color {
            format!("{ANSI_DIM}{ANSI_ITALIC}{PENDING_TEXT}{ANSI_RESET}")
        } else {
            PENDING_TEXT.to_string()
        };
        self.write_line(&text);
    }

    fn print_error(&mut self, error: &str) {
        let text = self.styled(ANSI_RED, &format!("Error: {error}"));
        self.write_line(&text);
    }

    fn print_info(&mut self, info: &str) {
        self.write_line(info);
    }
}
