//! Error types for Offchat
//!
//! This module defines the error taxonomy used throughout the application,
//! using `thiserror` for ergonomic error handling.
//!
//! Transport failures are captured as [`InferenceError`] and never reach the
//! presentation host as faults: they are rendered into an assistant reply via
//! [`InferenceError::user_message`]. Session lookups and validation failures
//! are reported as [`SessionError`] so the host can surface them explicitly.

use thiserror::Error;

/// Failure talking to the inference backend
///
/// Every variant maps to a human-readable reply through
/// [`InferenceError::user_message`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// The backend refused the connection or could not be resolved
    #[error("inference backend is unreachable")]
    Unreachable,

    /// The request did not complete within its timeout
    #[error("inference request timed out")]
    Timeout,

    /// The backend answered with a non-success status code
    #[error("inference backend returned status {0}")]
    BadStatus(u16),

    /// Any other transport or decoding fault
    #[error("inference request failed: {0}")]
    Other(String),
}

impl InferenceError {
    /// Render the error as the assistant reply shown in the conversation
    ///
    /// # Arguments
    ///
    /// * `host` - Backend base URL, named in the unreachable message
    ///
    /// # Examples
    ///
    /// ```
    /// use offchat::error::InferenceError;
    ///
    /// let text = InferenceError::BadStatus(500).user_message("http://localhost:11434");
    /// assert_eq!(text, "Error: Ollama API returned status code 500");
    /// ```
    pub fn user_message(&self, host: &str) -> String {
        match self {
            Self::Unreachable => {
                let address = host
                    .trim_start_matches("http://")
                    .trim_start_matches("https://");
                format!(
                    "❌ Error: Cannot connect to Ollama. Make sure Ollama is running on {}",
                    address
                )
            }
            Self::Timeout => {
                "⏱️ Error: Request timed out. The model might be taking too long to respond."
                    .to_string()
            }
            Self::BadStatus(code) => format!("Error: Ollama API returned status code {}", code),
            Self::Other(message) => format!("❌ Error: {}", message),
        }
    }

    /// Classify a `reqwest` failure into the inference taxonomy
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Unreachable
        } else if let Some(status) = err.status() {
            Self::BadStatus(status.as_u16())
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Failure of a session operation requested by the presentation host
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Model selection with an empty or whitespace-only name
    #[error("Invalid model name: a model must be a non-empty string")]
    InvalidModel,

    /// No archived chat carries the requested title
    #[error("No archived chat titled '{0}'")]
    NotFound(String),

    /// Submission rejected because the text was empty or whitespace-only
    #[error("Message is empty")]
    EmptyInput,

    /// Submission rejected while a response is still outstanding
    #[error("A response is still pending for this conversation")]
    Busy,

    /// Export requested before any exchange took place
    #[error("No messages to export yet")]
    NothingToExport,
}

/// Main error type for Offchat operations
#[derive(Error, Debug)]
pub enum OffchatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inference backend errors
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    /// The inference server does not know the requested model
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Session operation errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Line editor errors from the terminal host
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Result type alias for Offchat operations
///
/// Uses `anyhow::Error` so application plumbing can attach context while
/// typed errors stay recoverable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

/// Result of a single inference backend call
pub type InferenceResult<T> = std::result::Result<T, InferenceError>;
