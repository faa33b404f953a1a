//! Isolated sessions for multiple clients
//!
//! Each client key (a browser tab, a connection id) owns its own
//! [`ChatSession`]. Sessions share the backend, clock, and configuration
//! but never any conversation or model state.

use super::session::ChatSession;
use crate::clock::Clock;
use crate::config::Config;
use crate::inference::InferenceBackend;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Handle to one pooled session
pub type SharedSession = Arc<Mutex<ChatSession>>;

/// Registry of per-client chat sessions
pub struct SessionPool {
    config: Config,
    backend: Arc<dyn InferenceBackend>,
    clock: Arc<dyn Clock>,
    sessions: RwLock<HashMap<String, SharedSession>>,
}

impl SessionPool {
    pub fn new(config: Config, backend: Arc<dyn InferenceBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            backend,
            clock,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Session for `key`, created on first use
    pub async fn get_or_create(&self, key: &str) -> SharedSession {
        if let Some(session) = self.sessions.read().await.get(key) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(key.to_string()).or_insert_with(|| {
            tracing::debug!("Creating chat session for {}", key);
            Arc::new(Mutex::new(ChatSession::new(
                &self.config,
                Arc::clone(&self.backend),
                Arc::clone(&self.clock),
            )))
        });
        Arc::clone(session)
    }

    /// Drop the session for `key`; returns whether one existed
    pub async fn remove(&self, key: &str) -> bool {
        let removed = self.sessions.write().await.remove(key).is_some();
        if removed {
            tracing::debug!("Ended chat session for {}", key);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl std::fmt::Debug for SessionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPool")
            .field("host", &self.backend.host())
            .finish_non_exhaustive()
    }
}
