//! Request/response state machine for one chat session
//!
//! A session is either [`ChatPhase::Idle`] or
//! [`ChatPhase::AwaitingResponse`]. Submitting text moves it from idle to
//! awaiting; receiving the backend result (a completion or a translated
//! error) moves it back. Submissions while awaiting are rejected, so a
//! conversation never has two requests in flight. Each request carries an
//! id so a reply that outlives a clear or new chat is dropped instead of
//! landing in the wrong conversation.

use crate::clock::Clock;
use crate::config::Config;
use crate::error::{InferenceError, InferenceResult, SessionError};
use crate::inference::InferenceBackend;
use crate::registry::ModelRegistry;
use crate::session::{Message, SessionManager};

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Where a session is in its request/response cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatPhase {
    /// Ready for the next submission
    #[default]
    Idle,
    /// A user message was appended and its reply is outstanding
    AwaitingResponse,
}

/// All state owned by one client session
///
/// Nothing here is shared between sessions; each browser tab or terminal
/// gets its own value.
#[derive(Debug, Clone)]
pub struct SessionState {
    sessions: SessionManager,
    models: ModelRegistry,
    phase: ChatPhase,
    in_flight: Option<u64>,
    next_request_id: u64,
    backend_online: Option<bool>,
}

impl SessionState {
    /// Fresh state: greeted conversation, empty archive, default model
    pub fn new(config: &Config, clock: &dyn Clock) -> Self {
        Self {
            sessions: SessionManager::new(&config.session, clock),
            models: ModelRegistry::new(
                config.inference.default_model.clone(),
                config.inference.model_aliases.clone(),
            ),
            phase: ChatPhase::Idle,
            in_flight: None,
            next_request_id: 0,
            backend_online: None,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut SessionManager {
        &mut self.sessions
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut ModelRegistry {
        &mut self.models
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.phase == ChatPhase::AwaitingResponse
    }

    /// Result of the last health check, `None` if never checked
    pub fn backend_online(&self) -> Option<bool> {
        self.backend_online
    }

    pub(crate) fn set_backend_online(&mut self, online: bool) {
        self.backend_online = Some(online);
    }

    /// Force the session back to idle, dropping any outstanding reply
    pub(crate) fn reset_phase(&mut self) {
        if let Some(id) = self.in_flight.take() {
            tracing::debug!("Abandoning in-flight request {}", id);
        }
        self.phase = ChatPhase::Idle;
    }
}

/// A completion request produced by a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// Identifies the request within its session
    pub id: u64,
    /// Model identifier sent to the backend, aliases applied
    pub model: String,
    /// The submitted user text
    pub prompt: String,
}

/// Drives submissions through the inference backend
///
/// The orchestrator holds no session state of its own; every transition
/// takes the [`SessionState`] it acts on, so one orchestrator can serve
/// many isolated sessions.
#[derive(Clone)]
pub struct ChatOrchestrator {
    backend: Arc<dyn InferenceBackend>,
    clock: Arc<dyn Clock>,
    generate_timeout: Duration,
}

impl ChatOrchestrator {
    /// Create an orchestrator
    ///
    /// # Arguments
    ///
    /// * `backend` - Inference backend shared by every session
    /// * `clock` - Timestamp source for new messages
    /// * `generate_timeout` - Upper bound on one completion round-trip
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        clock: Arc<dyn Clock>,
        generate_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            clock,
            generate_timeout,
        }
    }

    pub fn backend(&self) -> &dyn InferenceBackend {
        self.backend.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// `Idle --submit(text)--> AwaitingResponse`
    ///
    /// Appends the trimmed text as a user message, fixes the conversation
    /// title if this is the first user message of a fresh chat, and returns
    /// the request to send.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyInput`] for empty or whitespace-only
    /// text and [`SessionError::Busy`] while a reply is outstanding. Neither
    /// mutates the conversation.
    pub fn submit(
        &self,
        state: &mut SessionState,
        text: &str,
    ) -> Result<PendingRequest, SessionError> {
        if state.phase == ChatPhase::AwaitingResponse {
            tracing::warn!("Submission rejected: response still pending");
            return Err(SessionError::Busy);
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyInput);
        }

        state
            .sessions
            .record_user_message(Message::user(text, self.clock.timestamp()));
        state.phase = ChatPhase::AwaitingResponse;
        state.next_request_id += 1;
        state.in_flight = Some(state.next_request_id);

        Ok(PendingRequest {
            id: state.next_request_id,
            model: state.models.resolved_model().to_string(),
            prompt: text.to_string(),
        })
    }

    /// Send a pending request to the backend
    ///
    /// The configured timeout is enforced here as well as by the backend,
    /// so a backend that ignores its timeout still cannot stall a session.
    pub async fn dispatch(&self, request: &PendingRequest) -> InferenceResult<String> {
        let call = self.backend.generate_completion(
            &request.model,
            &request.prompt,
            self.generate_timeout,
        );

        match tokio::time::timeout(self.generate_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "Completion for model {} exceeded {:?}",
                    request.model,
                    self.generate_timeout
                );
                Err(InferenceError::Timeout)
            }
        }
    }

    /// `AwaitingResponse --responseReceived(result)--> Idle`
    ///
    /// Appends the completion, or the error's user-facing text, as an
    /// assistant message. Returns `None` and changes nothing if the session
    /// is not awaiting this particular request (e.g. it was cleared
    /// meanwhile).
    pub fn receive(
        &self,
        state: &mut SessionState,
        request: &PendingRequest,
        result: InferenceResult<String>,
    ) -> Option<Message> {
        if state.phase != ChatPhase::AwaitingResponse || state.in_flight != Some(request.id) {
            tracing::debug!("Dropping stale response for request {}", request.id);
            return None;
        }

        let content = match result {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("Inference failed: {}", err);
                err.user_message(self.backend.host())
            }
        };

        let message = Message::assistant(content, self.clock.timestamp());
        state.sessions.active_mut().append(message.clone());
        state.phase = ChatPhase::Idle;
        state.in_flight = None;

        Some(message)
    }

    /// Run one full cycle: submit, dispatch, receive
    ///
    /// # Errors
    ///
    /// Only submission errors surface; backend failures become the
    /// assistant reply.
    pub async fn send(
        &self,
        state: &mut SessionState,
        text: &str,
    ) -> Result<Message, SessionError> {
        let request = self.submit(state, text)?;
        let result = self.dispatch(&request).await;
        self.receive(state, &request, result).ok_or(SessionError::Busy)
    }
}

impl std::fmt::Debug for ChatOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatOrchestrator")
            .field("host", &self.backend.host())
            .field("generate_timeout", &self.generate_timeout)
            .finish()
    }
}
