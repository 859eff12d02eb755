//! Conversation orchestration for remote agent chats.
//!
//! Provides:
//! - `SessionResolver` - lazy session creation with a bounded send fallback
//! - `ConversationController` - per-screen submit/subscribe orchestration
//! - Storage implementations (memory)

pub mod controller;
pub mod resolver;
pub mod storage;

pub use controller::{ControllerError, ConversationController, SubmitOutcome};
pub use resolver::{Resolution, SessionResolver};

#[cfg(test)]
pub(crate) mod test_support;
