//! Offchat - offline chat client library for a local Ollama server
//!
//! This library provides the core of Offchat: the chat-session state
//! machine, conversation and archive management, model discovery and
//! selection, and the HTTP adapter that talks to the inference backend.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `chat`: Request/response state machine, session facade, and session pool
//! - `session`: Messages, conversations, the chat archive, and new-chat/switch logic
//! - `registry`: Model selection, catalog refresh, and model aliases
//! - `inference`: Inference backend abstraction and the Ollama client
//! - `clock`: Timestamp sources supplied by the host
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`, `commands`: Command-line interface and terminal host
//!
//! # Example
//!
//! ```no_run
//! use offchat::chat::ChatSession;
//! use offchat::clock::SystemClock;
//! use offchat::inference::OllamaClient;
//! use offchat::Config;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let backend = Arc::new(OllamaClient::new(config.inference.host.clone())?);
//!     let mut session = ChatSession::new(&config, backend, Arc::new(SystemClock));
//!     let reply = session.on_user_submit("Hello!").await?;
//!     println!("{}", reply.content());
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod inference;
pub mod registry;
pub mod session;

// Re-export commonly used types
pub use chat::{ChatSession, SessionPool, SessionSnapshot};
pub use config::Config;
pub use error::{InferenceError, OffchatError, Result, SessionError};
pub use inference::{InferenceBackend, ModelInfo, OllamaClient};
pub use registry::ModelRegistry;

#[cfg(test)]
pub mod test_utils;
