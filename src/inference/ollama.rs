//! Ollama client implementation for Offchat
//!
//! Implements [`InferenceBackend`] over Ollama's HTTP API:
//!
//! - `POST /api/generate` for non-streaming completions
//! - `GET /api/tags` for the model catalog and health checks
//! - `POST /api/show` for model details

use crate::error::{InferenceError, InferenceResult, OffchatError, Result};
use crate::inference::{normalize_model_names, InferenceBackend, ModelInfo, MISSING_COMPLETION};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API client
///
/// Holds only the HTTP connection pool and the base URL; every operation
/// takes its own timeout so a slow model load cannot stall metadata calls.
///
/// # Examples
///
/// ```no_run
/// use offchat::inference::{InferenceBackend, OllamaClient};
/// use std::time::Duration;
///
/// # async fn example() -> offchat::error::Result<()> {
/// let client = OllamaClient::new("http://localhost:11434")?;
/// let reply = client
///     .generate_completion("phi3", "Hello!", Duration::from_secs(60))
///     .await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    host: String,
}

/// Request body for /api/generate
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response from /api/generate
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Response from Ollama's /api/tags endpoint
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

/// Model entry from /api/tags
#[derive(Debug, Deserialize)]
struct ModelTag {
    #[serde(default)]
    name: String,
}

/// Request body for /api/show
#[derive(Debug, Serialize)]
struct ShowRequest<'a> {
    name: &'a str,
}

/// Response from Ollama's /api/show endpoint
#[derive(Debug, Deserialize)]
struct ShowResponse {
    #[serde(default)]
    details: ModelDetails,
}

/// Model details from /api/show
#[derive(Debug, Deserialize, Default)]
struct ModelDetails {
    #[serde(default)]
    parameter_size: Option<String>,
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// # Arguments
    ///
    /// * `host` - Base URL of the Ollama server, e.g. `http://localhost:11434`
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use offchat::inference::{InferenceBackend, OllamaClient};
    ///
    /// let client = OllamaClient::new("http://localhost:11434/").unwrap();
    /// assert_eq!(client.host(), "http://localhost:11434");
    /// ```
    pub fn new(host: impl Into<String>) -> Result<Self> {
        let host = host.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .user_agent(concat!("offchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OffchatError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Ollama client: host={}", host);

        Ok(Self { client, host })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    async fn fetch_tags(&self, timeout: Duration) -> InferenceResult<TagsResponse> {
        let url = self.url("/api/tags");
        tracing::debug!("Fetching models from Ollama: {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to fetch Ollama models: {}", e);
                InferenceError::from_transport(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Ollama returned error {} for {}", status, url);
            return Err(InferenceError::BadStatus(status.as_u16()));
        }

        response.json::<TagsResponse>().await.map_err(|e| {
            tracing::error!("Failed to parse Ollama tags response: {}", e);
            InferenceError::from_transport(&e)
        })
    }

    async fn fetch_model_details(
        &self,
        model: &str,
        timeout: Duration,
    ) -> InferenceResult<ModelInfo> {
        let url = self.url("/api/show");
        tracing::debug!("Fetching model details for: {}", model);

        let response = self
            .client
            .post(&url)
            .json(&ShowRequest { name: model })
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| InferenceError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::BadStatus(status.as_u16()));
        }

        let show: ShowResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::from_transport(&e))?;

        let parameter_size = show
            .details
            .parameter_size
            .filter(|size| !size.trim().is_empty());

        Ok(ModelInfo::new(model, parameter_size))
    }
}

#[async_trait]
impl InferenceBackend for OllamaClient {
    fn host(&self) -> &str {
        &self.host
    }

    async fn generate_completion(
        &self,
        model: &str,
        prompt: &str,
        timeout: Duration,
    ) -> InferenceResult<String> {
        let url = self.url("/api/generate");
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        tracing::debug!(
            "Sending Ollama request: model={}, prompt_chars={}",
            model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Ollama request failed: {}", e);
                InferenceError::from_transport(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Ollama returned error {}", status);
            return Err(InferenceError::BadStatus(status.as_u16()));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Ollama response: {}", e);
            InferenceError::from_transport(&e)
        })?;

        match body.response {
            Some(text) => Ok(text.trim().to_string()),
            None => {
                tracing::warn!("Ollama response had no 'response' field");
                Ok(MISSING_COMPLETION.to_string())
            }
        }
    }

    async fn list_models(&self, timeout: Duration) -> InferenceResult<Vec<String>> {
        let tags = self.fetch_tags(timeout).await?;
        let names = normalize_model_names(tags.models.iter().map(|tag| tag.name.as_str()));
        tracing::debug!("Fetched {} models from Ollama", names.len());
        Ok(names)
    }

    async fn describe_model(&self, model: &str, timeout: Duration) -> Option<ModelInfo> {
        match self.fetch_model_details(model, timeout).await {
            Ok(info) => Some(info),
            Err(err) => {
                tracing::warn!("Failed to fetch Ollama model details for {}: {}", model, err);
                None
            }
        }
    }

    async fn health_check(&self, timeout: Duration) -> bool {
        let result = self
            .client
            .get(self.url("/api/tags"))
            .timeout(timeout)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!("Ollama health check failed: {}", err);
                false
            }
        }
    }
}
