//! Test utilities for Offchat
//!
//! Provides an in-memory [`InferenceBackend`] that returns canned results
//! and records the requests it receives.

use crate::error::{InferenceError, InferenceResult};
use crate::inference::{normalize_model_names, InferenceBackend, ModelInfo};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Canned inference backend for unit tests
pub struct FakeBackend {
    host: String,
    reply: InferenceResult<String>,
    models: InferenceResult<Vec<String>>,
    parameter_sizes: HashMap<String, String>,
    healthy: bool,
    delay: Option<Duration>,
    generate_calls: Mutex<Vec<(String, String)>>,
    list_calls: AtomicUsize,
}

impl FakeBackend {
    /// Healthy backend with no models that answers `"fake reply"`
    pub fn new() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            reply: Ok("fake reply".to_string()),
            models: Ok(Vec::new()),
            parameter_sizes: HashMap::new(),
            healthy: true,
            delay: None,
            generate_calls: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = Ok(reply.to_string());
        self
    }

    pub fn with_generate_error(mut self, err: InferenceError) -> Self {
        self.reply = Err(err);
        self
    }

    /// Raw catalog names; normalized the way a real client would
    pub fn with_models(mut self, raw: &[&str]) -> Self {
        self.models = Ok(normalize_model_names(raw));
        self
    }

    pub fn with_list_error(mut self, err: InferenceError) -> Self {
        self.models = Err(err);
        self
    }

    pub fn with_parameter_size(mut self, model: &str, size: &str) -> Self {
        self.parameter_sizes
            .insert(model.to_string(), size.to_string());
        self
    }

    /// Sleep this long inside every completion call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// `(model, prompt)` pairs received by `generate_completion`
    pub fn generate_calls(&self) -> Vec<(String, String)> {
        self.generate_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for FakeBackend {
    fn host(&self) -> &str {
        &self.host
    }

    async fn generate_completion(
        &self,
        model: &str,
        prompt: &str,
        _timeout: Duration,
    ) -> InferenceResult<String> {
        if let Ok(mut calls) = self.generate_calls.lock() {
            calls.push((model.to_string(), prompt.to_string()));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }

    async fn list_models(&self, _timeout: Duration) -> InferenceResult<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.models.clone()
    }

    async fn describe_model(&self, model: &str, _timeout: Duration) -> Option<ModelInfo> {
        self.parameter_sizes
            .get(model)
            .map(|size| ModelInfo::new(model, Some(size.clone())))
    }

    async fn health_check(&self, _timeout: Duration) -> bool {
        self.healthy
    }
}
