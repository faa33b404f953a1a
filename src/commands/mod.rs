/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`    - Interactive chat session in the terminal
- `models`  - Model listing and inspection
- `health`  - Inference server reachability check

These handlers are thin hosts over the library: they own the terminal and
drive a `ChatSession` through its `on_*` operations.
*/

use crate::chat::{ChatSession, SessionSnapshot, Transcript};
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::{OffchatError, Result};
use crate::inference::OllamaClient;
use crate::session::{Message, Role};
use colored::Colorize;
use std::sync::Arc;

// Special commands parser for the chat loop
pub mod special_commands;

// Model discovery commands
pub mod models;

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Connects to the inference server, creates a `ChatSession`, and runs
    //! a readline-based loop that submits user input and renders replies.

    use super::*;
    use crate::clock::SystemClock;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    ///
    /// # Returns
    ///
    /// Returns Ok(()) when the user exits, error if the terminal or HTTP
    /// client cannot be set up
    pub async fn run_chat(config: Config) -> Result<()> {
        let backend = Arc::new(OllamaClient::new(config.inference.host.clone())?);
        let mut session = ChatSession::new(&config, backend, Arc::new(SystemClock));

        let mut rl = DefaultEditor::new().map_err(OffchatError::Readline)?;

        let online = session.on_check_health().await;
        if online {
            session.ensure_models().await;
        }
        print_welcome_banner(&session.snapshot());

        loop {
            let prompt = format!("{} ", "you>".green().bold());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    if command == SpecialCommand::Exit {
                        break;
                    }

                    if command != SpecialCommand::None {
                        if let Err(e) = handle_special_command(&mut session, command).await {
                            eprintln!("{}\n", e.to_string().red());
                        }
                        continue;
                    }

                    if let Err(e) = rl.add_history_entry(trimmed) {
                        tracing::debug!("Failed to record history entry: {}", e);
                    }

                    println!("{}", "Bot is typing...".dimmed());
                    match session.on_user_submit(trimmed).await {
                        Ok(reply) => println!("{}\n", render_message(&reply)),
                        Err(e) => eprintln!("{}\n", e.to_string().red()),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn handle_special_command(
        session: &mut ChatSession,
        command: SpecialCommand,
    ) -> Result<()> {
        match command {
            SpecialCommand::NewChat => {
                match session.on_new_chat() {
                    Some(title) => println!("Archived \"{}\"", title.cyan()),
                    None => println!("Started a new chat"),
                }
                print_conversation(&session.snapshot());
            }
            SpecialCommand::ClearChat => {
                session.on_clear_chat();
                println!("Chat cleared");
                print_conversation(&session.snapshot());
            }
            SpecialCommand::SearchChats(query) => {
                let titles: Vec<&str> = session
                    .on_search(query.as_deref().unwrap_or(""))
                    .map(|chat| chat.title.as_str())
                    .collect();
                if titles.is_empty() {
                    println!("No matching chats\n");
                } else {
                    println!("\nRecent chats:");
                    for title in titles {
                        println!("  {}", title.cyan());
                    }
                    println!();
                }
            }
            SpecialCommand::SwitchChat(title) => match session.on_switch_chat(&title) {
                Ok(()) => print_conversation(&session.snapshot()),
                Err(e) => eprintln!("{}\n", e.to_string().red()),
            },
            SpecialCommand::ListModels => {
                session.ensure_models().await;
                print_models(&session.snapshot());
            }
            SpecialCommand::RefreshModels => {
                session.on_refresh_models().await;
                print_models(&session.snapshot());
            }
            SpecialCommand::SelectModel(name) => match session.on_select_model(&name) {
                Ok(()) => {
                    let snapshot = session.snapshot();
                    println!("Using model {}", snapshot.selected_model.cyan());
                    if snapshot.selection_stale {
                        println!(
                            "{}",
                            "Warning: the server does not list this model".yellow()
                        );
                    }
                    println!();
                }
                Err(e) => eprintln!("{}\n", e.to_string().red()),
            },
            SpecialCommand::ShowModelInfo(name) => {
                let name = name.unwrap_or_else(|| session.snapshot().selected_model);
                match session.on_describe_model(&name).await {
                    Some(info) => println!(
                        "\n{}: {} parameters\n",
                        info.name.cyan(),
                        info.parameter_size_label()
                    ),
                    None => eprintln!("{}\n", format!("No details for model {}", name).red()),
                }
            }
            SpecialCommand::Export(path) => match session.export() {
                Ok(transcript) => match save_transcript(transcript, path) {
                    Ok(path) => println!("Transcript saved to {}\n", path.green()),
                    Err(e) => eprintln!("{}\n", format!("Export failed: {}", e).red()),
                },
                Err(e) => eprintln!("{}\n", e.to_string().yellow()),
            },
            SpecialCommand::ShowStatus => print_status(&session.snapshot()),
            SpecialCommand::Health => {
                if session.on_check_health().await {
                    println!("{}\n", "🟢 Connected to Ollama".green());
                } else {
                    println!("{}\n", "🔴 Ollama not available".red());
                }
            }
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
        Ok(())
    }

    fn print_welcome_banner(snapshot: &SessionSnapshot) {
        println!("\n{}", "Offchat - local AI assistant".bold());
        println!("Model: {}", snapshot.selected_model.cyan());
        match snapshot.backend_online {
            Some(true) => println!("Server: {}", "connected".green()),
            Some(false) => println!(
                "Server: {} (replies will report the connection error)",
                "unreachable".red()
            ),
            None => println!("Server: {}", "not checked".yellow()),
        }
        println!("Type '/help' for commands, 'exit' to quit\n");
        print_conversation(snapshot);
    }

    fn print_conversation(snapshot: &SessionSnapshot) {
        println!("\n== {} ==\n", snapshot.title.bold());
        for message in &snapshot.messages {
            println!("{}\n", render_message(message));
        }
    }

    fn print_models(snapshot: &SessionSnapshot) {
        if snapshot.available_models.is_empty() {
            match &snapshot.model_error {
                Some(err) => eprintln!("{}\n", format!("Could not fetch models: {}", err).red()),
                None => println!("No models available\n"),
            }
            return;
        }

        println!("\nAvailable models:");
        for model in &snapshot.available_models {
            if model == &snapshot.selected_model {
                println!("  {} {}", "*".green(), model.green());
            } else {
                println!("    {}", model);
            }
        }
        println!();
    }

    fn print_status(snapshot: &SessionSnapshot) {
        for line in status_lines(snapshot) {
            println!("{}", line);
        }
        println!();
    }
}

// Health check command handler
pub mod health {
    //! Inference server health check.

    use super::*;
    use crate::inference::InferenceBackend;

    /// Check whether the inference server answers
    ///
    /// # Returns
    ///
    /// Returns Ok(true) when the server is reachable
    pub async fn run_health(config: &Config) -> Result<bool> {
        let client = OllamaClient::new(config.inference.host.clone())?;
        let online = client
            .health_check(config.inference.metadata_timeout())
            .await;

        if online {
            println!("{} {}", "🟢 Connected to Ollama at".green(), config.inference.host);
        } else {
            println!("{} {}", "🔴 Ollama not available at".red(), config.inference.host);
        }
        Ok(online)
    }
}

/// Render one message for the terminal: `[HH:MM:SS] You: text`
fn render_message(message: &Message) -> String {
    let label = match message.role() {
        Role::User => message.role().transcript_label().green().bold(),
        Role::Assistant => message.role().transcript_label().blue().bold(),
    };
    format!(
        "{} {}: {}",
        format!("[{}]", message.timestamp()).dimmed(),
        label,
        message.content()
    )
}

/// Write an exported transcript, to `path` or its suggested file name
///
/// Returns the path written.
fn save_transcript(transcript: Transcript, path: Option<String>) -> Result<String> {
    let path = path.unwrap_or(transcript.file_name);
    std::fs::write(&path, transcript.contents).map_err(OffchatError::Io)?;
    Ok(path)
}

/// Lines shown by `/status`
fn status_lines(snapshot: &SessionSnapshot) -> Vec<String> {
    let model = if snapshot.resolved_model == snapshot.selected_model {
        snapshot.selected_model.clone()
    } else {
        format!("{} ({})", snapshot.selected_model, snapshot.resolved_model)
    };
    let server = match snapshot.backend_online {
        Some(true) => "connected",
        Some(false) => "unreachable",
        None => "not checked",
    };

    vec![
        format!("Chat:      {}", snapshot.title),
        format!("Model:     {}", model),
        format!(
            "Messages:  {} total ({} you, {} bot)",
            snapshot.stats.total, snapshot.stats.user, snapshot.stats.assistant
        ),
        format!("Archived:  {} recent", snapshot.recent_chats.len()),
        format!("Server:    {}", server),
    ]
}
