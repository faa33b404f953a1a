//! Conversation state for a chat session
//!
//! This module contains the message and conversation types, the bounded
//! archive of earlier chats, and the session manager that ties them
//! together.

pub mod conversation;
pub mod history;
pub mod manager;
pub mod message;

pub use conversation::{ChatStats, Conversation, TRANSCRIPT_HEADER, UNTITLED};
pub use history::{ArchivedChat, ChatHistory};
pub use manager::SessionManager;
pub use message::{Message, Role};
