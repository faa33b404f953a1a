//! A single chat thread
//!
//! A conversation is an append-only log of messages for one thread plus a
//! title that is fixed once, from the first user message, and never
//! changed afterwards.

use super::message::{Message, Role};
use serde::Serialize;

/// Title shown for a conversation that has not been titled yet
pub const UNTITLED: &str = "New Chat";

/// Header line that opens every exported transcript
pub const TRANSCRIPT_HEADER: &str = "CHATBOT CONVERSATION";

/// Message counts for one conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChatStats {
    pub total: usize,
    pub user: usize,
    pub assistant: usize,
}

/// Ordered log of messages for one chat thread
///
/// # Examples
///
/// ```
/// use offchat::session::{Conversation, Message};
///
/// let mut conversation = Conversation::with_greeting("Hello!", "09:00:00");
/// conversation.append(Message::user("  What is Rust?  ", "09:00:05"));
/// assert_eq!(conversation.len(), 2);
/// assert_eq!(conversation.derive_title(30), "What is Rust?");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    title: Option<String>,
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty, untitled conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation opened by a synthetic assistant greeting
    pub fn with_greeting(greeting: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            title: None,
            messages: vec![Message::assistant(greeting, timestamp)],
        }
    }

    /// Rebuild a conversation from an archived snapshot
    pub fn from_messages(title: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            title: Some(title.into()),
            messages,
        }
    }

    /// Append a message to the end of the log
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Fixed title, if one has been set
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Title for display, `New Chat` while untitled
    pub fn display_title(&self) -> &str {
        self.title().unwrap_or(UNTITLED)
    }

    /// Set the title if none is set yet; returns whether it was applied
    pub fn fix_title(&mut self, title: impl Into<String>) -> bool {
        if self.title.is_some() {
            return false;
        }
        let title = title.into();
        if title.is_empty() {
            return false;
        }
        self.title = Some(title);
        true
    }

    /// Derive a title from the first user message
    ///
    /// Takes at most `max_chars` characters of that message and trims the
    /// result. Returns an empty string when no user message exists. The
    /// greeting never contributes, wherever it sits in the log.
    pub fn derive_title(&self, max_chars: usize) -> String {
        self.messages
            .iter()
            .find(|m| m.role() == Role::User)
            .map(|m| {
                m.content()
                    .chars()
                    .take(max_chars)
                    .collect::<String>()
                    .trim()
                    .to_string()
            })
            .unwrap_or_default()
    }

    /// True once the log holds at least one user message
    pub fn has_exchange(&self) -> bool {
        self.messages.iter().any(|m| m.role() == Role::User)
    }

    /// Count messages by role
    pub fn stats(&self) -> ChatStats {
        let user = self
            .messages
            .iter()
            .filter(|m| m.role() == Role::User)
            .count();
        ChatStats {
            total: self.messages.len(),
            user,
            assistant: self.messages.len() - user,
        }
    }

    /// Render the conversation as a plain-text transcript
    ///
    /// A fixed header and a rule are followed by one `[timestamp] Role:
    /// content` line per message, each followed by a blank line.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        out.push_str(TRANSCRIPT_HEADER);
        out.push('\n');
        out.push_str(&"=".repeat(50));
        out.push_str("\n\n");

        for message in &self.messages {
            out.push_str(&message.transcript_line());
            out.push_str("\n\n");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeted() -> Conversation {
        Conversation::with_greeting("Hello! How can I help?", "10:00:00")
    }

    #[test]
    fn test_with_greeting_starts_untitled() {
        let conversation = greeted();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.title(), None);
        assert_eq!(conversation.display_title(), "New Chat");
        assert!(!conversation.has_exchange());
    }

    #[test]
    fn test_derive_title_empty_without_user_message() {
        assert_eq!(greeted().derive_title(30), "");
        assert_eq!(Conversation::new().derive_title(30), "");
    }

    #[test]
    fn test_derive_title_truncates_and_trims() {
        let mut conversation = greeted();
        conversation.append(Message::user(
            "Explain the borrow checker to me like I am five",
            "10:00:01",
        ));
        assert_eq!(conversation.derive_title(30), "Explain the borrow checker to");
    }

    #[test]
    fn test_derive_title_counts_characters_not_bytes() {
        let mut conversation = greeted();
        conversation.append(Message::user("héllo wörld ünïcode", "10:00:01"));
        assert_eq!(conversation.derive_title(5), "héllo");
    }

    #[test]
    fn test_derive_title_uses_first_user_message_semantically() {
        let mut conversation = Conversation::new();
        conversation.append(Message::assistant("greeting", "10:00:00"));
        conversation.append(Message::assistant("another assistant note", "10:00:00"));
        conversation.append(Message::user("first question", "10:00:01"));
        conversation.append(Message::user("second question", "10:00:02"));
        assert_eq!(conversation.derive_title(30), "first question");
    }

    #[test]
    fn test_derive_title_is_idempotent() {
        let mut conversation = greeted();
        conversation.append(Message::user("Same title twice", "10:00:01"));
        assert_eq!(conversation.derive_title(30), conversation.derive_title(30));
    }

    #[test]
    fn test_fix_title_applies_once() {
        let mut conversation = greeted();
        assert!(!conversation.fix_title(""));
        assert!(conversation.fix_title("First"));
        assert!(!conversation.fix_title("Second"));
        assert_eq!(conversation.title(), Some("First"));
    }

    #[test]
    fn test_stats() {
        let mut conversation = greeted();
        conversation.append(Message::user("Hi", "10:00:01"));
        conversation.append(Message::assistant("Hello", "10:00:02"));
        assert_eq!(
            conversation.stats(),
            ChatStats {
                total: 3,
                user: 1,
                assistant: 2
            }
        );
    }

    #[test]
    fn test_transcript_contains_one_line_per_message_in_order() {
        let mut conversation = greeted();
        conversation.append(Message::user("What is 2+2?", "10:00:01"));
        conversation.append(Message::assistant("4", "10:00:02"));

        let transcript = conversation.transcript();
        assert!(transcript.starts_with("CHATBOT CONVERSATION\n=================================================="));

        let lines: Vec<&str> = transcript
            .lines()
            .filter(|line| line.starts_with('['))
            .collect();
        assert_eq!(
            lines,
            vec![
                "[10:00:00] Bot: Hello! How can I help?",
                "[10:00:01] You: What is 2+2?",
                "[10:00:02] Bot: 4",
            ]
        );
        assert!(transcript.ends_with("[10:00:02] Bot: 4\n\n"));
    }
}
