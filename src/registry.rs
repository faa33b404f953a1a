//! Model registry for a chat session
//!
//! Tracks the models the backend reports, the model the user selected, and
//! the alias table that rewrites short names into concrete tags before a
//! request leaves the process.

use crate::error::{InferenceError, SessionError};
use crate::inference::{InferenceBackend, ModelInfo};

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Per-session model selection and discovery state
///
/// The selection is preserved verbatim across refreshes even when the
/// backend stops listing it; the backend, not the registry, decides whether
/// a model exists.
///
/// # Examples
///
/// ```
/// use offchat::registry::ModelRegistry;
/// use std::collections::BTreeMap;
///
/// let aliases = BTreeMap::from([("qwen3".to_string(), "qwen3:0.6b".to_string())]);
/// let mut registry = ModelRegistry::new("phi3", aliases);
/// assert_eq!(registry.resolved_model(), "phi3");
///
/// registry.select("qwen3").unwrap();
/// assert_eq!(registry.selected(), "qwen3");
/// assert_eq!(registry.resolved_model(), "qwen3:0.6b");
/// ```
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    selected: String,
    available: Vec<String>,
    aliases: BTreeMap<String, String>,
    details: HashMap<String, ModelInfo>,
    last_error: Option<InferenceError>,
}

impl ModelRegistry {
    /// Create a registry with `default_model` selected and an empty catalog
    pub fn new(default_model: impl Into<String>, aliases: BTreeMap<String, String>) -> Self {
        Self {
            selected: default_model.into(),
            available: Vec::new(),
            aliases,
            details: HashMap::new(),
            last_error: None,
        }
    }

    /// Currently selected model name, exactly as chosen
    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// Last known catalog; empty when never fetched or the fetch failed
    pub fn available(&self) -> &[String] {
        &self.available
    }

    /// Error from the most recent refresh, if it failed
    pub fn last_error(&self) -> Option<&InferenceError> {
        self.last_error.as_ref()
    }

    /// True when the selection is absent from a non-empty catalog
    pub fn is_selection_stale(&self) -> bool {
        !self.available.is_empty() && !self.available.iter().any(|m| m == &self.selected)
    }

    /// Cached details for `model`, if previously described
    pub fn details(&self, model: &str) -> Option<&ModelInfo> {
        self.details.get(model)
    }

    /// Select a model
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidModel`] if `model` is empty or
    /// whitespace-only. Models missing from the catalog are accepted.
    pub fn select(&mut self, model: &str) -> Result<(), SessionError> {
        let model = model.trim();
        if model.is_empty() {
            return Err(SessionError::InvalidModel);
        }

        if self.selected != model {
            tracing::info!("Switched model from {} to {}", self.selected, model);
            self.selected = model.to_string();
        }

        Ok(())
    }

    /// Rewrite `model` through the alias table
    pub fn resolve<'a>(&'a self, model: &'a str) -> &'a str {
        self.aliases.get(model).map(String::as_str).unwrap_or(model)
    }

    /// The identifier sent to the backend for the current selection
    pub fn resolved_model(&self) -> &str {
        self.resolve(&self.selected)
    }

    /// Replace the catalog with a fresh listing from the backend
    ///
    /// A failed fetch leaves an empty catalog and records the error; the
    /// selection is never changed.
    pub async fn refresh(&mut self, backend: &dyn InferenceBackend, timeout: Duration) -> &[String] {
        match backend.list_models(timeout).await {
            Ok(models) => {
                tracing::debug!("Model catalog refreshed: {} models", models.len());
                self.available = models;
                self.last_error = None;
            }
            Err(err) => {
                tracing::warn!("Model catalog refresh failed: {}", err);
                self.available.clear();
                self.last_error = Some(err);
            }
        }

        if self.is_selection_stale() {
            tracing::debug!("Selected model {} not in catalog", self.selected);
        }

        &self.available
    }

    /// Refresh only when no catalog has been fetched yet
    pub async fn ensure_available(
        &mut self,
        backend: &dyn InferenceBackend,
        timeout: Duration,
    ) -> &[String] {
        if self.available.is_empty() {
            return self.refresh(backend, timeout).await;
        }
        &self.available
    }

    /// Describe `model` (aliases applied) and cache the result under `model`
    pub async fn describe(
        &mut self,
        backend: &dyn InferenceBackend,
        model: &str,
        timeout: Duration,
    ) -> Option<ModelInfo> {
        let resolved = self.resolve(model).to_string();
        let info = backend
            .describe_model(&resolved, timeout)
            .await
            .map(|info| ModelInfo::new(model, info.parameter_size));

        match &info {
            Some(info) => {
                self.details.insert(model.to_string(), info.clone());
            }
            None => {
                self.details.remove(model);
            }
        }

        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeBackend;

    fn registry() -> ModelRegistry {
        ModelRegistry::new(
            "phi3",
            BTreeMap::from([("qwen3".to_string(), "qwen3:0.6b".to_string())]),
        )
    }

    #[test]
    fn test_select_rejects_empty_name() {
        let mut registry = registry();
        assert_eq!(registry.select(""), Err(SessionError::InvalidModel));
        assert_eq!(registry.select("   "), Err(SessionError::InvalidModel));
        assert_eq!(registry.selected(), "phi3");
    }

    #[test]
    fn test_select_accepts_unlisted_model() {
        let mut registry = registry();
        registry.select("not-pulled-yet").unwrap();
        assert_eq!(registry.selected(), "not-pulled-yet");
    }

    #[test]
    fn test_alias_rewrite() {
        let mut registry = registry();
        registry.select("qwen3").unwrap();
        assert_eq!(registry.resolved_model(), "qwen3:0.6b");

        registry.select("phi3").unwrap();
        assert_eq!(registry.resolved_model(), "phi3");
    }

    #[tokio::test]
    async fn test_refresh_preserves_stale_selection() {
        let backend = FakeBackend::new().with_models(&["llama2", "mistral"]);
        let mut registry = registry();

        let models = registry.refresh(&backend, Duration::from_secs(5)).await;
        assert_eq!(models, ["llama2".to_string(), "mistral".to_string()]);
        assert_eq!(registry.selected(), "phi3");
        assert!(registry.is_selection_stale());
        assert!(registry.last_error().is_none());
    }

    #[tokio::test]
    async fn test_refresh_failure_yields_empty_catalog() {
        let backend = FakeBackend::new().with_models(&["phi3"]);
        let mut registry = registry();
        registry.refresh(&backend, Duration::from_secs(5)).await;
        assert_eq!(registry.available().len(), 1);

        let offline = FakeBackend::new().with_list_error(InferenceError::Unreachable);
        let models = registry.refresh(&offline, Duration::from_secs(5)).await;
        assert!(models.is_empty());
        assert_eq!(registry.last_error(), Some(&InferenceError::Unreachable));
        assert!(!registry.is_selection_stale());
    }

    #[tokio::test]
    async fn test_ensure_available_fetches_once() {
        let backend = FakeBackend::new().with_models(&["phi3"]);
        let mut registry = registry();

        registry.ensure_available(&backend, Duration::from_secs(5)).await;
        registry.ensure_available(&backend, Duration::from_secs(5)).await;
        assert_eq!(backend.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_describe_applies_alias_and_caches() {
        let backend = FakeBackend::new().with_parameter_size("qwen3:0.6b", "751.63M");
        let mut registry = registry();

        let info = registry
            .describe(&backend, "qwen3", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(info.name, "qwen3");
        assert_eq!(info.parameter_size_label(), "751.63M");
        assert_eq!(registry.details("qwen3"), Some(&info));
    }

    #[tokio::test]
    async fn test_describe_unknown_model_is_none() {
        let backend = FakeBackend::new();
        let mut registry = registry();
        let info = registry
            .describe(&backend, "missing", Duration::from_secs(5))
            .await;
        assert!(info.is_none());
        assert!(registry.details("missing").is_none());
    }
}
