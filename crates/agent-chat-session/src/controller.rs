//! Per-screen conversation orchestration.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use agent_chat_core::{
    AgentApi, ApiError, ConversationId, MessageFeed, MessageRecord, MessageStore, Role, SessionRef,
    SourceContext, StoreError,
};
use tokio::sync::RwLock;

use crate::resolver::SessionResolver;

/// Conversation titles are clipped to this many characters of the
/// first prompt.
const TITLE_MAX_CHARS: usize = 30;

/// Conversation controller error.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("Agent API error: {0}")]
    Api(#[from] ApiError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),
}

/// What happened to a submit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The exchange completed and both turns were appended.
    Completed,
    /// Empty input, rejected before any network call or store write.
    EmptyInput,
    /// A submit was already in flight; this one was dropped, not queued.
    Busy,
}

/// Orchestrates one conversation screen: accepts input, resolves the
/// remote session, writes both turns through the store, and exposes the
/// live feed as the single rendering source.
pub struct ConversationController<A: AgentApi, S: MessageStore> {
    store: Arc<S>,
    resolver: SessionResolver<A>,
    state: RwLock<ScreenState>,
    sending: AtomicBool,
}

struct ScreenState {
    conversation: Option<ConversationId>,
    session: SessionRef,
    feed: Option<MessageFeed>,
}

/// Resets the in-flight flag on every exit path, so the controller
/// always returns to idle.
struct SendingGuard<'a>(&'a AtomicBool);

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<A: AgentApi, S: MessageStore> ConversationController<A, S> {
    /// Create a controller for a fresh, unsaved conversation.
    #[must_use]
    pub fn new(api: Arc<A>, store: Arc<S>, routing: SourceContext) -> Self {
        Self {
            store,
            resolver: SessionResolver::new(api, routing),
            state: RwLock::new(ScreenState {
                conversation: None,
                session: SessionRef::Unresolved,
                feed: None,
            }),
            sending: AtomicBool::new(false),
        }
    }

    /// Open an existing conversation, replacing the current one.
    ///
    /// The previous feed is torn down before the new subscription is
    /// established, so no stale emission crosses conversations.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown conversation id.
    pub async fn open_conversation(&self, id: ConversationId) -> Result<(), ControllerError> {
        let conversation = self
            .store
            .get_conversation(id)
            .await?
            .ok_or(ControllerError::NotFound(id))?;

        let mut state = self.state.write().await;
        state.feed = None;
        state.conversation = Some(id);
        state.session = SessionRef::from_stored(conversation.agent_session_id);
        state.feed = Some(self.store.subscribe(id).await?);

        Ok(())
    }

    /// Submit one user input.
    ///
    /// At most one submit is in flight per controller; one arriving
    /// while another is pending is dropped, not queued. Empty input is
    /// rejected before any network call or store write. On failure the
    /// already-appended user message stays in the store and no
    /// synthetic agent message is appended.
    ///
    /// # Errors
    /// Propagates store failures and terminal resolver failures.
    pub async fn submit(&self, input: &str) -> Result<SubmitOutcome, ControllerError> {
        let content = input.trim();
        if content.is_empty() {
            return Ok(SubmitOutcome::EmptyInput);
        }

        if self
            .sending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(SubmitOutcome::Busy);
        }
        let _guard = SendingGuard(&self.sending);

        let conversation = self.ensure_conversation(content).await?;
        self.store.append(conversation, Role::User, content).await?;

        let session = self.state.read().await.session.clone();
        let resolution = self.resolver.resolve_and_send(&session, content).await?;

        self.store
            .append(conversation, Role::Agent, &resolution.reply.content)
            .await?;

        if let Some(minted) = resolution.minted_session_id {
            self.promote_session(conversation, minted).await?;
        }

        Ok(SubmitOutcome::Completed)
    }

    /// Current ordered transcript; empty when no conversation exists
    /// yet.
    pub async fn messages(&self) -> Vec<MessageRecord> {
        match &self.state.read().await.feed {
            Some(feed) => feed.current().as_ref().clone(),
            None => Vec::new(),
        }
    }

    /// Whether a submit is in flight.
    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::SeqCst)
    }

    /// The remote session reference for this conversation.
    pub async fn session(&self) -> SessionRef {
        self.state.read().await.session.clone()
    }

    /// The active conversation id, once one has been created.
    pub async fn conversation_id(&self) -> Option<ConversationId> {
        self.state.read().await.conversation
    }

    /// Replace the default routing for newly created sessions.
    pub fn set_routing(&self, routing: SourceContext) {
        self.resolver.set_routing(routing);
    }

    /// Lazily create the conversation record and its subscription on
    /// the first submit.
    async fn ensure_conversation(
        &self,
        first_prompt: &str,
    ) -> Result<ConversationId, ControllerError> {
        let mut state = self.state.write().await;
        if let Some(id) = state.conversation {
            return Ok(id);
        }

        let title: String = first_prompt.chars().take(TITLE_MAX_CHARS).collect();
        let id = self.store.create_conversation(&title).await?;
        state.conversation = Some(id);
        state.feed = Some(self.store.subscribe(id).await?);

        Ok(id)
    }

    /// Promote a freshly minted session id to the active identifier.
    /// A conversation is promoted at most once; subsequent sends reuse
    /// the resolved id and never re-trigger creation.
    async fn promote_session(
        &self,
        conversation: ConversationId,
        minted: String,
    ) -> Result<(), ControllerError> {
        self.store
            .set_agent_session_id(conversation, &minted)
            .await?;

        tracing::debug!(session = %minted, "promoted agent session");
        self.state.write().await.session = SessionRef::Resolved(minted);

        Ok(())
    }
}
