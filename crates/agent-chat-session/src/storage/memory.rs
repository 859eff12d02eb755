//! In-memory message store.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
    time::{SystemTime, UNIX_EPOCH},
};

use agent_chat_core::{
    Conversation, ConversationId, MessageFeed, MessageRecord, MessageStore, Role, StoreError,
};
use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

/// In-memory store implementation.
///
/// Useful for development, tests, and single-process deployments.
/// Data is lost on restart.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

struct Inner {
    conversations: HashMap<ConversationId, Conversation>,
    logs: HashMap<ConversationId, Log>,
}

struct Log {
    records: Vec<MessageRecord>,
    feed_tx: watch::Sender<Arc<Vec<MessageRecord>>>,
}

fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

impl MemoryStore {
    /// Create a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                conversations: HashMap::new(),
                logs: HashMap::new(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create_conversation(&self, title: &str) -> Result<ConversationId, StoreError> {
        let id = Uuid::new_v4();
        let timestamp = now_micros();

        let conversation = Conversation {
            id,
            title: title.to_string(),
            agent_session_id: None,
            created_at: timestamp,
            updated_at: timestamp,
        };

        let (feed_tx, _) = watch::channel(Arc::new(Vec::new()));

        let mut inner = self
            .inner
            .write()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        inner.conversations.insert(id, conversation);
        inner.logs.insert(
            id,
            Log {
                records: Vec::new(),
                feed_tx,
            },
        );

        Ok(id)
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        Ok(self
            .inner
            .read()
            .map_err(|e| StoreError::Write(e.to_string()))?
            .conversations
            .get(&id)
            .cloned())
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| StoreError::Write(e.to_string()))?;

        let mut result: Vec<Conversation> = inner.conversations.values().cloned().collect();
        // Newest first, for history listings.
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(result)
    }

    async fn set_agent_session_id(
        &self,
        id: ConversationId,
        session_id: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| StoreError::Write(e.to_string()))?;

        let conversation = inner
            .conversations
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;

        conversation.agent_session_id = Some(session_id.to_string());
        conversation.updated_at = now_micros();

        Ok(())
    }

    async fn append(
        &self,
        id: ConversationId,
        role: Role,
        content: &str,
    ) -> Result<MessageRecord, StoreError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        let inner = &mut *guard;

        let log = inner.logs.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        // Store-assigned ordering key: strictly monotonic within a
        // conversation regardless of caller clocks or issue order.
        let last = log.records.last().map_or(0, |r| r.created_at);
        let created_at = now_micros().max(last + 1);

        let record = MessageRecord {
            role,
            content: content.to_string(),
            created_at,
        };
        log.records.push(record.clone());

        // Live listeners get the full ordered snapshot, never a diff.
        // send_replace also stores it when nobody is subscribed yet, so
        // a later subscription starts from the current log.
        let _ = log.feed_tx.send_replace(Arc::new(log.records.clone()));

        if let Some(conversation) = inner.conversations.get_mut(&id) {
            conversation.updated_at = created_at;
        }

        Ok(record)
    }

    async fn snapshot(&self, id: ConversationId) -> Result<Vec<MessageRecord>, StoreError> {
        Ok(self
            .inner
            .read()
            .map_err(|e| StoreError::Write(e.to_string()))?
            .logs
            .get(&id)
            .map(|log| log.records.clone())
            .unwrap_or_default())
    }

    async fn subscribe(&self, id: ConversationId) -> Result<MessageFeed, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| StoreError::Subscription(e.to_string()))?;

        let log = inner.logs.get(&id).ok_or(StoreError::NotFound(id))?;
        Ok(MessageFeed::new(log.feed_tx.subscribe()))
    }
}
