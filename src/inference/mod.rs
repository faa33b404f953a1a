//! Inference client module for Offchat
//!
//! This module contains the inference backend abstraction and the Ollama
//! implementation used by the chat orchestrator and model registry.

pub mod base;
pub mod ollama;

pub use base::{normalize_model_names, InferenceBackend, ModelInfo, MISSING_COMPLETION};
pub use ollama::OllamaClient;
