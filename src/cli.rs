//! Command-line interface definition for Offchat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, model discovery, and
//! backend health checks.

use clap::{Parser, Subcommand};

/// Offchat - offline chat client for a local Ollama server
///
/// Chat with locally hosted models, keep several named conversations per
/// session, and export transcripts as plain text.
#[derive(Parser, Debug, Clone)]
#[command(name = "offchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the inference server base URL
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Override the model selected at session start
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Offchat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Inspect models available on the inference server
    Models {
        /// Model subcommand
        #[command(subcommand)]
        command: ModelCommand,
    },

    /// Check whether the inference server is reachable
    Health,
}

/// Model subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ModelCommand {
    /// List available models (tags stripped, deduplicated, sorted)
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show details about one model
    Info {
        /// Model name
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            host: None,
            model: None,
            command: Commands::Chat,
        }
    }
}
