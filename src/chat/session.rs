//! Host-facing chat session
//!
//! [`ChatSession`] bundles one client's [`SessionState`] with the shared
//! orchestrator and exposes the operations a presentation host drives:
//! submitting text, the chat lifecycle buttons, model selection, and a
//! read-only [`SessionSnapshot`] for rendering.

use super::orchestrator::{ChatOrchestrator, ChatPhase, PendingRequest, SessionState};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{InferenceResult, SessionError};
use crate::inference::{InferenceBackend, ModelInfo};
use crate::session::{ArchivedChat, ChatStats, Message};

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Read-only view of a session for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub title: String,
    pub messages: Vec<Message>,
    pub phase: ChatPhase,
    /// True between submission and response; drives the typing indicator
    pub awaiting_response: bool,
    pub selected_model: String,
    pub resolved_model: String,
    pub available_models: Vec<String>,
    /// Selected model is missing from a non-empty catalog
    pub selection_stale: bool,
    /// Titles of the recent archive window, most recent first
    pub recent_chats: Vec<String>,
    pub stats: ChatStats,
    pub backend_online: Option<bool>,
    /// Why the last catalog refresh failed, if it did
    pub model_error: Option<String>,
}

/// Plain-text transcript ready for the host to save or offer for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Suggested name, `chat_history_YYYYMMDD_HHMMSS.txt`
    pub file_name: String,
    pub contents: String,
}

/// One client's chat session
///
/// # Examples
///
/// ```no_run
/// use offchat::chat::ChatSession;
/// use offchat::clock::SystemClock;
/// use offchat::inference::OllamaClient;
/// use offchat::Config;
/// use std::sync::Arc;
///
/// # async fn run() -> anyhow::Result<()> {
/// let config = Config::default();
/// let backend = Arc::new(OllamaClient::new(&config.inference.host)?);
/// let mut session = ChatSession::new(&config, backend, Arc::new(SystemClock));
///
/// let reply = session.on_user_submit("Why is the sky blue?").await?;
/// println!("{}", reply.content());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChatSession {
    orchestrator: ChatOrchestrator,
    state: SessionState,
    metadata_timeout: Duration,
}

impl ChatSession {
    /// Create a session with a greeted conversation and the default model
    pub fn new(config: &Config, backend: Arc<dyn InferenceBackend>, clock: Arc<dyn Clock>) -> Self {
        let state = SessionState::new(config, clock.as_ref());
        let orchestrator =
            ChatOrchestrator::new(backend, clock, config.inference.generate_timeout());

        Self {
            orchestrator,
            state,
            metadata_timeout: config.inference.metadata_timeout(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn orchestrator(&self) -> &ChatOrchestrator {
        &self.orchestrator
    }

    /// Submit user text and wait for the assistant reply
    ///
    /// Backend failures come back as the reply text; only submission
    /// errors are returned as `Err`.
    pub async fn on_user_submit(&mut self, text: &str) -> Result<Message, SessionError> {
        self.orchestrator.send(&mut self.state, text).await
    }

    /// First half of a submission for hosts that release the session
    /// between submit and response
    ///
    /// Pass the returned request to [`ChatOrchestrator::dispatch`], then
    /// hand the result to [`ChatSession::finish_response`].
    pub fn begin_user_submit(&mut self, text: &str) -> Result<PendingRequest, SessionError> {
        self.orchestrator.submit(&mut self.state, text)
    }

    /// Second half of a split submission
    pub fn finish_response(
        &mut self,
        request: &PendingRequest,
        result: InferenceResult<String>,
    ) -> Option<Message> {
        self.orchestrator.receive(&mut self.state, request, result)
    }

    /// Archive the current chat if it qualifies and start a fresh one
    ///
    /// Returns the archived title, if any. An outstanding reply is dropped.
    pub fn on_new_chat(&mut self) -> Option<String> {
        self.state.reset_phase();
        self.state
            .sessions_mut()
            .start_new_chat(self.orchestrator.clock())
    }

    /// Reset the conversation to a fresh greeting without archiving
    pub fn on_clear_chat(&mut self) {
        self.state.reset_phase();
        self.state.sessions_mut().clear(self.orchestrator.clock());
    }

    /// Make an archived chat the active conversation
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if no archived chat has `title`.
    pub fn on_switch_chat(&mut self, title: &str) -> Result<(), SessionError> {
        self.state.sessions_mut().switch_to(title)?;
        self.state.reset_phase();
        Ok(())
    }

    /// Archived chats in the recent window whose titles contain `query`
    pub fn on_search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a ArchivedChat> + 'a {
        self.state.sessions().search(query)
    }

    /// Select the model for subsequent requests
    pub fn on_select_model(&mut self, name: &str) -> Result<(), SessionError> {
        self.state.models_mut().select(name)
    }

    /// Re-query the backend for its model catalog
    pub async fn on_refresh_models(&mut self) -> &[String] {
        self.state
            .models_mut()
            .refresh(self.orchestrator.backend(), self.metadata_timeout)
            .await
    }

    /// Fetch the catalog if it has never been fetched (or came back empty)
    pub async fn ensure_models(&mut self) -> &[String] {
        self.state
            .models_mut()
            .ensure_available(self.orchestrator.backend(), self.metadata_timeout)
            .await
    }

    /// Look up details for `name`, caching them in the registry
    pub async fn on_describe_model(&mut self, name: &str) -> Option<ModelInfo> {
        self.state
            .models_mut()
            .describe(self.orchestrator.backend(), name, self.metadata_timeout)
            .await
    }

    /// Probe the backend and record the result for the snapshot
    pub async fn on_check_health(&mut self) -> bool {
        let online = self
            .orchestrator
            .backend()
            .health_check(self.metadata_timeout)
            .await;
        self.state.set_backend_online(online);
        online
    }

    /// Render the active conversation for export
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NothingToExport`] when the conversation
    /// holds nothing beyond the greeting.
    pub fn export(&self) -> Result<Transcript, SessionError> {
        let active = self.state.sessions().active();
        if active.len() <= 1 {
            return Err(SessionError::NothingToExport);
        }

        Ok(Transcript {
            file_name: format!(
                "chat_history_{}.txt",
                self.orchestrator.clock().export_stamp()
            ),
            contents: active.transcript(),
        })
    }

    /// Capture the state a host needs to render this session
    pub fn snapshot(&self) -> SessionSnapshot {
        let sessions = self.state.sessions();
        let models = self.state.models();
        let active = sessions.active();

        SessionSnapshot {
            title: active.display_title().to_string(),
            messages: active.messages().to_vec(),
            phase: self.state.phase(),
            awaiting_response: self.state.is_awaiting_response(),
            selected_model: models.selected().to_string(),
            resolved_model: models.resolved_model().to_string(),
            available_models: models.available().to_vec(),
            selection_stale: models.is_selection_stale(),
            recent_chats: sessions
                .history()
                .recent()
                .map(|chat| chat.title.clone())
                .collect(),
            stats: active.stats(),
            backend_online: self.state.backend_online(),
            model_error: models.last_error().map(|err| err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::InferenceError;
    use crate::session::Role;
    use crate::test_utils::FakeBackend;

    fn session_with(backend: FakeBackend) -> (ChatSession, Arc<FakeBackend>) {
        let backend = Arc::new(backend);
        let session = ChatSession::new(
            &Config::default(),
            backend.clone(),
            Arc::new(FixedClock::new("14:30:00")),
        );
        (session, backend)
    }

    #[tokio::test]
    async fn test_full_exchange_updates_snapshot() {
        let (mut session, _) = session_with(FakeBackend::new().with_reply("Paris."));
        session
            .on_user_submit("What is the capital of France?")
            .await
            .unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.title, "What is the capital of France?");
        assert_eq!(snapshot.messages.len(), 3);
        assert_eq!(snapshot.messages[2].content(), "Paris.");
        assert!(!snapshot.awaiting_response);
        assert_eq!(
            snapshot.stats,
            ChatStats {
                total: 3,
                user: 1,
                assistant: 2
            }
        );
    }

    #[test]
    fn test_split_submission_shows_typing_indicator() {
        let (mut session, _) = session_with(FakeBackend::new());
        let request = session.begin_user_submit("hi").unwrap();
        assert!(session.snapshot().awaiting_response);
        assert_eq!(session.begin_user_submit("again"), Err(SessionError::Busy));

        let reply = session
            .finish_response(&request, Ok("hello".to_string()))
            .unwrap();
        assert_eq!(reply.role(), Role::Assistant);
        assert!(!session.snapshot().awaiting_response);
    }

    #[tokio::test]
    async fn test_new_chat_archives_and_lists_recent() {
        let (mut session, _) = session_with(FakeBackend::new());
        session.on_user_submit("Tell me about tokio").await.unwrap();

        assert_eq!(session.on_new_chat().as_deref(), Some("Tell me about tokio"));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.title, "New Chat");
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.recent_chats, vec!["Tell me about tokio"]);

        let found: Vec<&str> = session
            .on_search("TOKIO")
            .map(|chat| chat.title.as_str())
            .collect();
        assert_eq!(found, vec!["Tell me about tokio"]);
    }

    #[tokio::test]
    async fn test_switch_chat_restores_archive() {
        let (mut session, _) = session_with(FakeBackend::new());
        session.on_user_submit("first topic").await.unwrap();
        session.on_new_chat();
        session.on_user_submit("second topic").await.unwrap();

        session.on_switch_chat("first topic").unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.title, "first topic");
        assert_eq!(snapshot.messages[1].content(), "first topic");

        assert_eq!(
            session.on_switch_chat("nope"),
            Err(SessionError::NotFound("nope".to_string()))
        );
        assert_eq!(session.snapshot().title, "first topic");
    }

    #[test]
    fn test_clear_while_awaiting_returns_to_idle() {
        let (mut session, _) = session_with(FakeBackend::new());
        let request = session.begin_user_submit("slow question").unwrap();

        session.on_clear_chat();
        let snapshot = session.snapshot();
        assert!(!snapshot.awaiting_response);
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.title, "New Chat");
        assert!(snapshot.recent_chats.is_empty());

        assert!(session
            .finish_response(&request, Ok("too late".to_string()))
            .is_none());
        assert_eq!(session.snapshot().messages.len(), 1);
    }

    #[tokio::test]
    async fn test_export_requires_more_than_greeting() {
        let (mut session, _) = session_with(FakeBackend::new().with_reply("4"));
        assert_eq!(session.export(), Err(SessionError::NothingToExport));

        session.on_user_submit("2+2?").await.unwrap();
        let transcript = session.export().unwrap();
        assert!(transcript.file_name.starts_with("chat_history_"));
        assert!(transcript.file_name.ends_with(".txt"));
        assert!(transcript.contents.starts_with("CHATBOT CONVERSATION\n"));
        assert!(transcript.contents.contains("[14:30:00] You: 2+2?\n\n"));
        assert!(transcript.contents.ends_with("[14:30:00] Bot: 4\n\n"));
    }

    #[tokio::test]
    async fn test_model_selection_and_discovery() {
        let (mut session, backend) =
            session_with(FakeBackend::new().with_models(&["llama2:7b", "qwen3:0.6b"]));

        let models = session.ensure_models().await.to_vec();
        assert_eq!(models, vec!["llama2", "qwen3"]);
        session.ensure_models().await;
        assert_eq!(backend.list_calls(), 1);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.selected_model, "phi3");
        assert!(snapshot.selection_stale);

        session.on_select_model("qwen3").unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.resolved_model, "qwen3:0.6b");
        assert!(!snapshot.selection_stale);

        session.on_user_submit("hi").await.unwrap();
        assert_eq!(backend.generate_calls()[0].0, "qwen3:0.6b");

        assert_eq!(session.on_select_model(" "), Err(SessionError::InvalidModel));
    }

    #[tokio::test]
    async fn test_refresh_failure_reported_in_snapshot() {
        let (mut session, _) =
            session_with(FakeBackend::new().with_list_error(InferenceError::Unreachable));

        assert!(session.on_refresh_models().await.is_empty());
        let snapshot = session.snapshot();
        assert!(snapshot.available_models.is_empty());
        assert!(snapshot.model_error.is_some());
        assert_eq!(snapshot.selected_model, "phi3");
    }

    #[tokio::test]
    async fn test_health_and_describe() {
        let (mut session, _) = session_with(
            FakeBackend::new()
                .unhealthy()
                .with_parameter_size("phi3", "3.8B"),
        );
        assert_eq!(session.snapshot().backend_online, None);
        assert!(!session.on_check_health().await);
        assert_eq!(session.snapshot().backend_online, Some(false));

        let info = session.on_describe_model("phi3").await.unwrap();
        assert_eq!(info.parameter_size_label(), "3.8B");
        assert!(session.on_describe_model("llama2").await.is_none());
    }

    #[test]
    fn test_snapshot_serializes() {
        let (session, _) = session_with(FakeBackend::new());
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["phase"], "idle");
        assert_eq!(json["messages"][0]["role"], "assistant");
        assert_eq!(json["title"], "New Chat");
    }
}
