//! Interactive chat client for the tool-executing orchestrator.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a local orchestrator
//! toolchat
//!
//! # Point at a deployment and authenticate
//! toolchat --base-url https://chat.example.com/api/ --token "$TOKEN"
//!
//! # Restrict tools to two domains from the start
//! toolchat --domains hr,erp
//!
//! # Read settings from a YAML file
//! toolchat --config toolchat.yaml
//! ```
//!
//! Set `TOOLCHAT_LOG=debug` to see request logs on stderr.

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use toolchat::chat::{
    ChatArgs, ChatCommand, ChatConfig, Input, PlainTextRenderer, Renderer, help_text, parse_input,
};
use toolchat::render::role_label;
use toolchat::{Client, Role, SessionController, SubmitOutcome};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "TOOLCHAT_LOG";

/// Main entry point for the toolchat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let (args, _) = ChatArgs::from_command_line_relaxed("toolchat [OPTIONS]");
    let config = ChatConfig::resolve(&args)?;
    let mut renderer = PlainTextRenderer::with_color(config.use_color);

    let client = config.client()?;
    let controller = SessionController::new(client);
    if let Err(err) = controller.load_domains().await {
        renderer.print_error(&format!("Could not load tool catalog: {}", err.message()));
    }
    for domain in &config.domains {
        controller.toggle_domain(domain);
    }

    println!("Tool Chat ({})", controller.backend().base_url());
    print_domains(&controller);
    println!("Type /help for commands, /quit to exit\n");

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("You: ") {
            Ok(line) => {
                let Some(input) = parse_input(&line) else {
                    continue;
                };
                let _ = rl.add_history_entry(line.trim());

                match input {
                    Input::Command(ChatCommand::Quit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Input::Command(cmd) => run_command(&controller, &mut renderer, cmd).await,
                    Input::Message(text) => {
                        submit_and_render(&controller, &mut renderer, text).await
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn submit_and_render(
    controller: &SessionController<Client>,
    renderer: &mut PlainTextRenderer,
    text: &str,
) {
    // join! polls submit first, and submit appends the placeholder before
    // its first await, so the watcher sees it on the first pass.
    let (outcome, ()) = tokio::join!(controller.submit(text), async {
        let snapshot = controller.snapshot();
        if let Some(placeholder) = snapshot.messages().last().filter(|m| m.pending) {
            renderer.print_message(placeholder);
        }
    });

    match outcome {
        SubmitOutcome::Resolved => {
            let snapshot = controller.snapshot();
            if let Some(answer) = snapshot.messages().last() {
                renderer.print_message(answer);
            }
        }
        SubmitOutcome::Failed(message) => renderer.print_error(&message),
        SubmitOutcome::Ignored | SubmitOutcome::Discarded => {}
    }
}

async fn run_command(
    controller: &SessionController<Client>,
    renderer: &mut PlainTextRenderer,
    cmd: ChatCommand,
) {
    let client = controller.backend();
    match cmd {
        ChatCommand::New => {
            controller.reset();
            renderer.print_info("Started a new conversation.");
        }
        ChatCommand::ToggleDomain(domain) => {
            let known = controller.available_domains().contains(&domain);
            controller.toggle_domain(&domain);
            if !known {
                renderer.print_info(&format!("Note: '{domain}' is not in the tool catalog."));
            }
            print_domains(controller);
        }
        ChatCommand::ListDomains => print_domains(controller),
        ChatCommand::AllDomains => {
            controller.clear_domain_filter();
            renderer.print_info("Using tools from all domains.");
        }
        ChatCommand::Tools(domain) => match client.list_tools(domain.as_deref()).await {
            Ok(listing) if listing.tools.is_empty() => renderer.print_info("No tools."),
            Ok(listing) => {
                for tool in &listing.tools {
                    println!("    {:<32} {}", tool.name, tool.description);
                }
            }
            Err(err) => renderer.print_error(err.message()),
        },
        ChatCommand::History(id) => {
            let Some(id) = id.or_else(|| controller.conversation_id()) else {
                renderer.print_info("No conversation yet.");
                return;
            };
            match client.get_conversation(&id).await {
                Ok(history) => {
                    for message in &history.messages {
                        renderer.print_turn(history_label(&message.role), &message.content);
                    }
                }
                Err(err) => renderer.print_error(err.message()),
            }
        }
        ChatCommand::Conversations => match client.list_conversations().await {
            Ok(list) if list.conversations.is_empty() => renderer.print_info("No conversations."),
            Ok(list) => {
                for conversation in &list.conversations {
                    println!(
                        "    {}  {} messages, updated {}",
                        conversation.id, conversation.message_count, conversation.updated_at
                    );
                }
            }
            Err(err) => renderer.print_error(err.message()),
        },
        ChatCommand::Delete(id) => match client.delete_conversation(&id).await {
            Ok(()) => {
                if controller.conversation_id().as_deref() == Some(id.as_str()) {
                    controller.reset();
                }
                renderer.print_info(&format!("Deleted conversation {id}."));
            }
            Err(err) => renderer.print_error(err.message()),
        },
        ChatCommand::Health => match client.health_check().await {
            Ok(health) => {
                println!("    Status: {}", health.status);
                println!("    Tool server: {}", health.dependency_status);
                println!("    Tools: {}", health.tool_count);
                println!("    Conversations: {}", health.conversation_count);
            }
            Err(err) => renderer.print_error(err.message()),
        },
        ChatCommand::Status => print_status(controller),
        ChatCommand::Help => {
            for line in help_text().lines() {
                println!("    {}", line);
            }
        }
        ChatCommand::Quit => {}
        ChatCommand::Invalid(message) => renderer.print_error(&message),
    }
}

fn history_label(role: &str) -> &str {
    match role {
        "user" => role_label(Role::User),
        "assistant" => role_label(Role::Assistant),
        other => other,
    }
}

fn print_domains(controller: &SessionController<Client>) {
    let filter = controller.domain_filter();
    if filter.available().is_empty() {
        println!("    Domains: (none)");
    } else {
        println!("    Domains: {}", filter.available().join(", "));
    }
    if filter.selected().is_empty() {
        println!("    Selected: all");
    } else {
        let selected: Vec<&str> = filter.selected().iter().map(String::as_str).collect();
        println!("    Selected: {}", selected.join(", "));
    }
}

fn print_status(controller: &SessionController<Client>) {
    let state = controller.snapshot();
    println!("    Session Status:");
    println!(
        "      Conversation: {}",
        state.conversation_id().unwrap_or("(new)")
    );
    println!("      Messages: {}", state.messages().len());
    println!("      Busy: {}", if state.is_busy() { "yes" } else { "no" });
    match state.last_error() {
        Some(err) => println!("      Last error: {}", err),
        None => println!("      Last error: (none)"),
    }
    let selected = controller.selected_domains();
    if selected.is_empty() {
        println!("      Domains: all");
    } else {
        println!("      Domains: {}", selected.join(", "));
    }
}
