//! Trait seams for the remote agent API and the message store.

use async_trait::async_trait;
use thiserror::Error;

use crate::feed::MessageFeed;
use crate::types::{
    AgentReply, AgentSession, Conversation, ConversationId, MessageRecord, Role, Source,
    SourceContext,
};

/// Remote agent API error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No API key configured; checked before any request is made.
    #[error("API key not set")]
    MissingApiKey,
    /// The remote rejected session creation.
    #[error("Session creation failed ({status}): {body}")]
    CreateSession { status: u16, body: String },
    /// The remote rejected a send.
    #[error("Send failed ({status}): {body}")]
    SendMessage { status: u16, body: String },
    /// Transport-level failure before an HTTP status was available.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Message store error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The conversation does not exist.
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),
    /// A write was not acknowledged.
    #[error("Store write failed: {0}")]
    Write(String),
    /// Listener registration failed.
    #[error("Subscription failed: {0}")]
    Subscription(String),
    /// The producing store went away while a feed was being awaited.
    #[error("Feed closed")]
    FeedClosed,
}

/// Stateless client for the remote agent service.
///
/// Implementations own credential injection and response normalization;
/// callers see normalized types and the error taxonomy above.
#[async_trait]
pub trait AgentApi: Send + Sync {
    /// Whether a non-empty API key is configured.
    fn has_api_key(&self) -> bool;

    /// List source repositories visible to the credential.
    ///
    /// Advisory only: any failure degrades to an empty list and must
    /// never block the conversation flow.
    async fn list_sources(&self) -> Vec<Source>;

    /// Create a remote session seeded with `prompt`.
    ///
    /// # Errors
    /// Returns `MissingApiKey` before any request when no key is set,
    /// `CreateSession` on a non-2xx response.
    async fn create_session(
        &self,
        prompt: &str,
        ctx: &SourceContext,
    ) -> Result<AgentSession, ApiError>;

    /// Send `content` to an existing session.
    ///
    /// Accepts a bare session id or a full resource name.
    ///
    /// # Errors
    /// Returns `MissingApiKey` before any request when no key is set,
    /// `SendMessage` on a non-2xx response.
    async fn send_message(&self, session_id: &str, content: &str) -> Result<AgentReply, ApiError>;
}

/// Durable, ordered, per-conversation message log with push updates.
///
/// The store exclusively owns persisted records; consumers never hold
/// an authoritative copy, only snapshots delivered through the feed.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Mint a conversation id and write its metadata record.
    ///
    /// # Errors
    /// Returns `Write` if the record could not be persisted.
    async fn create_conversation(&self, title: &str) -> Result<ConversationId, StoreError>;

    /// Get a conversation's metadata record.
    ///
    /// # Errors
    /// Returns `Write` on a backend failure; an unknown id is `Ok(None)`.
    async fn get_conversation(&self, id: ConversationId)
    -> Result<Option<Conversation>, StoreError>;

    /// List conversation metadata, newest first.
    ///
    /// # Errors
    /// Returns `Write` on a backend failure.
    async fn list_conversations(&self) -> Result<Vec<Conversation>, StoreError>;

    /// Record the promoted remote session id on a conversation.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown conversation.
    async fn set_agent_session_id(
        &self,
        id: ConversationId,
        session_id: &str,
    ) -> Result<(), StoreError>;

    /// Append one record with a store-assigned monotonic timestamp.
    ///
    /// Paired user/agent writes are two independent appends; the
    /// timestamp, not call order, decides the final ordering.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown conversation, `Write` if the
    /// append was not acknowledged.
    async fn append(
        &self,
        id: ConversationId,
        role: Role,
        content: &str,
    ) -> Result<MessageRecord, StoreError>;

    /// One-shot ordered read of a conversation's log.
    ///
    /// An unknown id yields an empty sequence, matching document-store
    /// semantics for an absent collection.
    ///
    /// # Errors
    /// Returns `Write` on a backend failure.
    async fn snapshot(&self, id: ConversationId) -> Result<Vec<MessageRecord>, StoreError>;

    /// Register a live feed over a conversation's log.
    ///
    /// Every emission is the full ordered snapshot; dropping the feed
    /// is the unsubscribe.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown conversation, `Subscription`
    /// if listener registration fails.
    async fn subscribe(&self, id: ConversationId) -> Result<MessageFeed, StoreError>;
}
