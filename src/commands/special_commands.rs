//! Special commands parser for the interactive chat host
//!
//! This module parses the slash commands that can be entered during an
//! interactive chat session. Special commands allow users to:
//! - Start, clear, search, and switch conversations
//! - List, inspect, and select models
//! - Export the transcript and check the backend
//!
//! Command names are case-insensitive; arguments (chat titles, model
//! names, paths) are kept as typed.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it does not take
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session rather than being sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Archive the current chat (if it has an exchange) and start fresh
    NewChat,

    /// Reset the current chat to the greeting without archiving
    ClearChat,

    /// List recent archived chats, optionally filtered by a title query
    SearchChats(Option<String>),

    /// Make an archived chat the active one
    SwitchChat(String),

    /// List models reported by the backend
    ListModels,

    /// Select the model for subsequent messages
    SelectModel(String),

    /// Re-query the backend for its model list
    RefreshModels,

    /// Show details for a model, the selected one if none is named
    ShowModelInfo(Option<String>),

    /// Write the transcript to a file, a timestamped name if none is given
    Export(Option<String>),

    /// Show title, model, and message counts
    ShowStatus,

    /// Check whether the backend is reachable
    Health,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the model as a chat message.
    None,
}

/// Parse a user input string into a special command
///
/// # Arguments
///
/// * `input` - The user input string to parse
///
/// # Returns
///
/// Returns Ok(SpecialCommand) for valid commands or SpecialCommand::None for
/// regular chat text.
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an argument it does not take.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use offchat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/switch Rust Lifetimes").unwrap();
/// assert_eq!(cmd, SpecialCommand::SwitchChat("Rust Lifetimes".to_string()));
///
/// let cmd = parse_special_command("/MODEL qwen3").unwrap();
/// assert_eq!(cmd, SpecialCommand::SelectModel("qwen3".to_string()));
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') {
        return match lower.as_str() {
            "exit" | "quit" => Ok(SpecialCommand::Exit),
            _ => Ok(SpecialCommand::None),
        };
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), Some(rest.trim()).filter(|a| !a.is_empty())),
        None => (lower, None),
    };

    let no_argument = |command: SpecialCommand| match arg {
        Some(arg) => Err(CommandError::UnsupportedArgument {
            command: name.clone(),
            arg: arg.to_string(),
        }),
        None => Ok(command),
    };
    let required = |usage: &str| {
        arg.map(str::to_string)
            .ok_or_else(|| CommandError::MissingArgument {
                command: name.clone(),
                usage: usage.to_string(),
            })
    };

    match name.as_str() {
        "/new" => no_argument(SpecialCommand::NewChat),
        "/clear" => no_argument(SpecialCommand::ClearChat),
        "/chats" | "/search" => Ok(SpecialCommand::SearchChats(arg.map(str::to_string))),
        "/switch" => required("/switch <chat title>").map(SpecialCommand::SwitchChat),

        "/models" => no_argument(SpecialCommand::ListModels),
        "/model" => required("/model <model_name>").map(SpecialCommand::SelectModel),
        "/refresh" => no_argument(SpecialCommand::RefreshModels),
        "/info" => Ok(SpecialCommand::ShowModelInfo(arg.map(str::to_string))),

        "/export" => Ok(SpecialCommand::Export(arg.map(str::to_string))),
        "/status" => no_argument(SpecialCommand::ShowStatus),
        "/health" => no_argument(SpecialCommand::Health),
        "/help" | "/?" => no_argument(SpecialCommand::Help),
        "/exit" | "/quit" => no_argument(SpecialCommand::Exit),

        _ => Err(CommandError::UnknownCommand(name.clone())),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

CONVERSATIONS:
  /new              - Archive this chat and start a new one
  /clear            - Clear this chat back to the greeting (nothing is archived)
  /chats [query]    - List recent chats, filtered by title if a query is given
  /search [query]   - Same as /chats
  /switch <title>   - Continue an archived chat

MODELS:
  /models           - List models available on the server
  /model <name>     - Use a different model for the next messages
  /refresh          - Ask the server for its model list again
  /info [name]      - Show details for a model (default: the selected one)

SESSION:
  /export [path]    - Save the transcript to a text file
  /status           - Show chat title, model, and message counts
  /health           - Check whether the server is reachable
  /help             - Show this help message
  /?                - Same as /help

SESSION CONTROL:
  exit              - Exit interactive mode
  quit              - Same as exit

NOTES:
  - Command names are case-insensitive; titles and model names are not
  - Regular text (not starting with /) is sent to the model
"#
    );
}
