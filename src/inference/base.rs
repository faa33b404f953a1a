//! Inference backend abstraction
//!
//! Defines the [`InferenceBackend`] trait that the chat orchestrator and
//! model registry talk to, plus the transient [`ModelInfo`] record returned
//! by model description calls.

use crate::error::InferenceResult;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Placeholder completion used when the backend omits the `response` field
pub const MISSING_COMPLETION: &str = "Sorry, I couldn't generate a response.";

/// Details about a single model
///
/// Re-fetched on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name as requested
    pub name: String,
    /// Parameter size reported by the backend (e.g. `3.8B`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_size: Option<String>,
}

impl ModelInfo {
    /// Create a new model record
    ///
    /// # Examples
    ///
    /// ```
    /// use offchat::inference::ModelInfo;
    ///
    /// let info = ModelInfo::new("phi3", Some("3.8B".to_string()));
    /// assert_eq!(info.parameter_size_label(), "3.8B");
    /// ```
    pub fn new(name: impl Into<String>, parameter_size: Option<String>) -> Self {
        Self {
            name: name.into(),
            parameter_size,
        }
    }

    /// Parameter size for display, `Unknown` when the backend did not report one
    pub fn parameter_size_label(&self) -> &str {
        self.parameter_size.as_deref().unwrap_or("Unknown")
    }
}

/// Request/response operations against an inference server
///
/// Implementations are stateless: every call is an independent round-trip
/// bounded by the supplied timeout. Failures are translated into
/// `InferenceError` and never retried.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Base URL of the backend, used when rendering connection errors
    fn host(&self) -> &str;

    /// Generate a non-streaming completion for `prompt` with `model`
    ///
    /// # Errors
    ///
    /// Returns `BadStatus` for non-success responses, `Unreachable` when
    /// the connection is refused, `Timeout` when `timeout` elapses, and
    /// `Other` for anything else.
    async fn generate_completion(
        &self,
        model: &str,
        prompt: &str,
        timeout: Duration,
    ) -> InferenceResult<String>;

    /// List bare model names: tags stripped, duplicates removed, sorted
    ///
    /// # Errors
    ///
    /// Returns the transport error so callers can tell an empty catalog
    /// from a failed fetch.
    async fn list_models(&self, timeout: Duration) -> InferenceResult<Vec<String>>;

    /// Describe a model; `None` on any failure
    async fn describe_model(&self, model: &str, timeout: Duration) -> Option<ModelInfo>;

    /// True iff the catalog endpoint answers with a success status in time
    async fn health_check(&self, timeout: Duration) -> bool;
}

/// Reduce raw catalog identifiers to sorted, deduplicated bare names
///
/// Each identifier is truncated at its first `:` (tag separator); empty
/// names are dropped.
///
/// # Examples
///
/// ```
/// use offchat::inference::normalize_model_names;
///
/// let names = normalize_model_names(["llama2:7b", "llama2:13b", "phi3"]);
/// assert_eq!(names, vec!["llama2", "phi3"]);
/// ```
pub fn normalize_model_names<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut names: Vec<String> = raw
        .into_iter()
        .filter_map(|name| {
            let bare = name.as_ref().split(':').next().unwrap_or_default().trim();
            (!bare.is_empty()).then(|| bare.to_string())
        })
        .collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_tags_and_dedupes() {
        let names = normalize_model_names(["llama2:7b", "llama2:13b", "phi3"]);
        assert_eq!(names, vec!["llama2".to_string(), "phi3".to_string()]);
    }

    #[test]
    fn test_normalize_sorts_alphabetically() {
        let names = normalize_model_names(["qwen3:0.6b", "gemma:2b", "mistral:latest"]);
        assert_eq!(names, vec!["gemma", "mistral", "qwen3"]);
    }

    #[test]
    fn test_normalize_drops_empty_names() {
        let names = normalize_model_names(["", ":latest", "phi3"]);
        assert_eq!(names, vec!["phi3"]);
    }

    #[test]
    fn test_model_info_unknown_parameter_size() {
        let info = ModelInfo::new("phi3", None);
        assert_eq!(info.parameter_size_label(), "Unknown");
    }

    #[test]
    fn test_model_info_json_skips_missing_size() {
        let json = serde_json::to_string(&ModelInfo::new("phi3", None)).unwrap();
        assert_eq!(json, r#"{"name":"phi3"}"#);
    }
}
