//! Core abstractions for conversing with a remote coding agent.
//!
//! This crate provides the fundamental building blocks:
//! - `MessageFeed` - Snapshot-based live view over a conversation log
//! - `AgentConfig` - Credential and default-routing configuration
//! - `extract_reply_text` - Defensive reply extraction over loose payloads
//! - `AgentApi` and `MessageStore` traits

pub mod config;
pub mod feed;
pub mod reply;
pub mod traits;
pub mod types;

pub use config::{AgentConfig, ConfigError};
pub use feed::MessageFeed;
pub use reply::extract_reply_text;
pub use traits::{AgentApi, ApiError, MessageStore, StoreError};
pub use types::{
    AgentReply, AgentSession, Conversation, ConversationId, MessageRecord, Role, SessionRef,
    Source, SourceContext,
};
