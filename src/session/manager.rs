//! Active conversation and archive management
//!
//! The session manager owns the conversation currently on screen plus the
//! archive of earlier chats, and implements the new-chat, switch, clear,
//! and search actions.

use super::conversation::Conversation;
use super::history::{ArchivedChat, ChatHistory};
use super::message::Message;
use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::error::SessionError;

/// Owner of the active conversation and the chat archive
///
/// # Examples
///
/// ```
/// use offchat::clock::FixedClock;
/// use offchat::config::SessionConfig;
/// use offchat::session::{Message, SessionManager};
///
/// let clock = FixedClock::new("08:00:00");
/// let mut manager = SessionManager::new(&SessionConfig::default(), &clock);
/// manager.active_mut().append(Message::user("Plan a trip to Oslo", "08:00:01"));
///
/// assert_eq!(manager.start_new_chat(&clock).as_deref(), Some("Plan a trip to Oslo"));
/// assert_eq!(manager.active().len(), 1);
/// assert!(manager.switch_to("Plan a trip to Oslo").is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct SessionManager {
    active: Conversation,
    history: ChatHistory,
    new_chat_started: bool,
    greeting: String,
    title_max_chars: usize,
}

impl SessionManager {
    /// Create a manager holding a freshly greeted conversation
    ///
    /// A brand-new session counts as a freshly started chat, so its first
    /// user message fixes the title.
    pub fn new(config: &SessionConfig, clock: &dyn Clock) -> Self {
        Self {
            active: Conversation::with_greeting(config.greeting.clone(), clock.timestamp()),
            history: ChatHistory::new(config.history_capacity, config.recent_window),
            new_chat_started: true,
            greeting: config.greeting.clone(),
            title_max_chars: config.title_max_chars,
        }
    }

    pub fn active(&self) -> &Conversation {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut Conversation {
        &mut self.active
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Whether the next user message should fix the conversation title
    pub fn new_chat_started(&self) -> bool {
        self.new_chat_started
    }

    /// Append a user message, fixing the title if this chat was just started
    ///
    /// Returns the title fixed by this call, if any.
    pub fn record_user_message(&mut self, message: Message) -> Option<String> {
        self.active.append(message);

        if !self.new_chat_started {
            return None;
        }

        let title = self.active.derive_title(self.title_max_chars);
        self.new_chat_started = false;
        if self.active.fix_title(title.clone()) {
            tracing::debug!("Conversation titled: {}", title);
            Some(title)
        } else {
            None
        }
    }

    /// Archive the active conversation if worthwhile and start a fresh one
    ///
    /// The active conversation is archived only when it holds a real
    /// exchange, its derived title is non-empty, and no archived chat
    /// already uses that title. Returns the archived title, if any.
    pub fn start_new_chat(&mut self, clock: &dyn Clock) -> Option<String> {
        let archived = self.archive_active();

        self.active = Conversation::with_greeting(self.greeting.clone(), clock.timestamp());
        self.new_chat_started = true;

        tracing::info!(
            archived = archived.as_deref().unwrap_or(""),
            "Started new chat"
        );
        archived
    }

    fn archive_active(&mut self) -> Option<String> {
        if !self.active.has_exchange() {
            return None;
        }

        let title = self.active.derive_title(self.title_max_chars);
        if title.is_empty() {
            return None;
        }

        if self.history.contains_title(&title) {
            tracing::debug!("Chat titled '{}' already archived, skipping", title);
            return None;
        }

        self.history.push(ArchivedChat::new(
            title.clone(),
            self.active.messages().to_vec(),
        ));
        Some(title)
    }

    /// Replace the active conversation with a copy of an archived chat
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] if no archived chat has `title`;
    /// the active conversation is left untouched.
    pub fn switch_to(&mut self, title: &str) -> Result<(), SessionError> {
        let chat = self
            .history
            .find(title)
            .ok_or_else(|| SessionError::NotFound(title.to_string()))?;

        self.active = Conversation::from_messages(chat.title.clone(), chat.messages.clone());
        self.new_chat_started = false;

        tracing::info!("Switched to archived chat: {}", title);
        Ok(())
    }

    /// Reset the active conversation to a fresh greeting without archiving
    ///
    /// The old title goes with the cleared messages; the next user message
    /// fixes a new one.
    pub fn clear(&mut self, clock: &dyn Clock) {
        self.active = Conversation::with_greeting(self.greeting.clone(), clock.timestamp());
        self.new_chat_started = true;
        tracing::info!("Chat cleared");
    }

    /// Case-insensitive title search over the recent archive window
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a ArchivedChat> + 'a {
        self.history.search(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::session::Role;

    fn manager() -> (SessionManager, FixedClock) {
        let clock = FixedClock::new("10:00:00");
        (SessionManager::new(&SessionConfig::default(), &clock), clock)
    }

    fn chat(manager: &mut SessionManager, text: &str) {
        manager.record_user_message(Message::user(text, "10:00:01"));
        manager
            .active_mut()
            .append(Message::assistant("reply", "10:00:02"));
    }

    #[test]
    fn test_new_session_is_greeted_and_fresh() {
        let (manager, _) = manager();
        assert_eq!(manager.active().len(), 1);
        assert_eq!(manager.active().messages()[0].role(), Role::Assistant);
        assert!(manager.new_chat_started());
        assert!(manager.history().is_empty());
    }

    #[test]
    fn test_record_user_message_fixes_title_once() {
        let (mut manager, _) = manager();
        let title = manager.record_user_message(Message::user("First question here", "10:00:01"));
        assert_eq!(title.as_deref(), Some("First question here"));
        assert!(!manager.new_chat_started());

        let title = manager.record_user_message(Message::user("Second", "10:00:03"));
        assert!(title.is_none());
        assert_eq!(manager.active().title(), Some("First question here"));
    }

    #[test]
    fn test_start_new_chat_archives_snapshot() {
        let (mut manager, clock) = manager();
        chat(&mut manager, "How do I sort a Vec?");

        let archived = manager.start_new_chat(&clock);
        assert_eq!(archived.as_deref(), Some("How do I sort a Vec?"));
        assert_eq!(manager.history().len(), 1);
        assert_eq!(manager.history().iter().next().unwrap().messages.len(), 3);
        assert_eq!(manager.active().len(), 1);
        assert!(manager.new_chat_started());
    }

    #[test]
    fn test_start_new_chat_twice_archives_at_most_once() {
        let (mut manager, clock) = manager();
        chat(&mut manager, "Only one archive");

        manager.start_new_chat(&clock);
        let second = manager.start_new_chat(&clock);
        assert!(second.is_none());
        assert_eq!(manager.history().len(), 1);
    }

    #[test]
    fn test_start_new_chat_without_exchange_archives_nothing() {
        let (mut manager, clock) = manager();
        assert!(manager.start_new_chat(&clock).is_none());
        assert!(manager.history().is_empty());
    }

    #[test]
    fn test_start_new_chat_dedupes_by_title() {
        let (mut manager, clock) = manager();
        chat(&mut manager, "Same question");
        manager.start_new_chat(&clock);

        chat(&mut manager, "Same question");
        manager
            .active_mut()
            .append(Message::user("different follow-up", "10:00:05"));
        assert!(manager.start_new_chat(&clock).is_none());
        assert_eq!(manager.history().len(), 1);
    }

    #[test]
    fn test_switch_to_unknown_title_leaves_active_unchanged() {
        let (mut manager, _) = manager();
        chat(&mut manager, "Current chat");
        let before = manager.active().clone();

        let result = manager.switch_to("nonexistent");
        assert_eq!(result, Err(SessionError::NotFound("nonexistent".to_string())));
        assert_eq!(manager.active(), &before);
    }

    #[test]
    fn test_switch_to_copies_archive() {
        let (mut manager, clock) = manager();
        chat(&mut manager, "Archived topic");
        manager.start_new_chat(&clock);

        manager.switch_to("Archived topic").unwrap();
        assert_eq!(manager.active().title(), Some("Archived topic"));
        assert!(!manager.new_chat_started());

        manager
            .active_mut()
            .append(Message::user("more", "10:01:00"));
        let archived = manager.history().find("Archived topic").unwrap();
        assert_eq!(archived.messages.len(), 3);
        assert_eq!(manager.active().len(), 4);
    }

    #[test]
    fn test_clear_resets_to_greeting_and_title() {
        let (mut manager, clock) = manager();
        chat(&mut manager, "Old topic");
        manager.clear(&clock);

        assert_eq!(manager.active().len(), 1);
        assert_eq!(manager.active().title(), None);
        assert!(manager.new_chat_started());
        assert!(manager.history().is_empty());
    }

    #[test]
    fn test_chat_after_clear_archives_under_shown_title() {
        let (mut manager, clock) = manager();
        chat(&mut manager, "Alpha topic");
        manager.clear(&clock);
        chat(&mut manager, "Beta topic");

        let shown = manager.active().title().map(str::to_string);
        let archived = manager.start_new_chat(&clock);
        assert_eq!(shown.as_deref(), Some("Beta topic"));
        assert_eq!(archived, shown);
        assert!(manager.switch_to("Beta topic").is_ok());
        assert!(manager.history().find("Alpha topic").is_none());
    }

    #[test]
    fn test_search_most_recent_first() {
        let (mut manager, clock) = manager();
        for topic in ["rust one", "python", "rust two"] {
            chat(&mut manager, topic);
            manager.start_new_chat(&clock);
        }

        let titles: Vec<&str> = manager.search("rust").map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["rust two", "rust one"]);
    }
}
