//! Archive of finished conversations
//!
//! Archived chats are kept in insertion order with FIFO eviction beyond a
//! fixed capacity. Only the most recent window is surfaced to search and
//! the recent-chats list.

use super::message::Message;
use serde::Serialize;
use std::collections::VecDeque;

/// Snapshot of a conversation taken when a new chat was started
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchivedChat {
    pub title: String,
    pub messages: Vec<Message>,
}

impl ArchivedChat {
    pub fn new(title: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            title: title.into(),
            messages,
        }
    }
}

/// Bounded, insertion-ordered list of archived chats
///
/// # Examples
///
/// ```
/// use offchat::session::{ArchivedChat, ChatHistory};
///
/// let mut history = ChatHistory::new(50, 5);
/// history.push(ArchivedChat::new("Rust lifetimes", Vec::new()));
/// history.push(ArchivedChat::new("Tokio basics", Vec::new()));
///
/// let titles: Vec<&str> = history.search("RUST").map(|c| c.title.as_str()).collect();
/// assert_eq!(titles, vec!["Rust lifetimes"]);
/// ```
#[derive(Debug, Clone)]
pub struct ChatHistory {
    entries: VecDeque<ArchivedChat>,
    capacity: usize,
    window: usize,
}

impl ChatHistory {
    /// Create an empty history
    ///
    /// `capacity` and `window` are clamped to at least one entry.
    pub fn new(capacity: usize, window: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            window: window.clamp(1, capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Archive a chat, evicting the oldest entries beyond capacity
    pub fn push(&mut self, chat: ArchivedChat) {
        self.entries.push_back(chat);
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::debug!("Evicted archived chat: {}", evicted.title);
            }
        }
    }

    /// True if any retained chat carries exactly `title`
    pub fn contains_title(&self, title: &str) -> bool {
        self.entries.iter().any(|chat| chat.title == title)
    }

    /// Most recent chat with exactly `title`, searching everything retained
    pub fn find(&self, title: &str) -> Option<&ArchivedChat> {
        self.entries.iter().rev().find(|chat| chat.title == title)
    }

    /// The most recent `window` chats, most recent first
    pub fn recent(&self) -> impl Iterator<Item = &ArchivedChat> + '_ {
        self.entries.iter().rev().take(self.window)
    }

    /// Case-insensitive title search over the recent window
    ///
    /// Matches are yielded lazily, most recent first. An empty query
    /// matches every chat in the window.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a ArchivedChat> + 'a {
        let needle = query.to_lowercase();
        self.recent()
            .filter(move |chat| chat.title.to_lowercase().contains(&needle))
    }

    /// Every retained chat in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ArchivedChat> + '_ {
        self.entries.iter()
    }
}
