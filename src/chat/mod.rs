//! Chat orchestration for Offchat
//!
//! This module contains the request/response state machine, the
//! host-facing session facade, and the pool that keeps per-client sessions
//! isolated from each other.

pub mod orchestrator;
pub mod pool;
pub mod session;

pub use orchestrator::{ChatOrchestrator, ChatPhase, PendingRequest, SessionState};
pub use pool::{SessionPool, SharedSession};
pub use session::{ChatSession, SessionSnapshot, Transcript};
