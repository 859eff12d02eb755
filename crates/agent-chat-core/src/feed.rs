//! Snapshot-based live view over a conversation log.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::traits::StoreError;
use crate::types::MessageRecord;

/// Live, ordered view of one conversation's messages.
///
/// Every emission is the full snapshot sorted by creation time, never a
/// diff: consumers replace their view wholesale, which eliminates any
/// merge between optimistic and authoritative state. Dropping the feed
/// is the unsubscribe.
#[derive(Debug)]
pub struct MessageFeed {
    rx: watch::Receiver<Arc<Vec<MessageRecord>>>,
}

impl MessageFeed {
    /// Wrap a receiver produced by a store backend.
    #[must_use]
    pub const fn new(rx: watch::Receiver<Arc<Vec<MessageRecord>>>) -> Self {
        Self { rx }
    }

    /// The current snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<Vec<MessageRecord>> {
        self.rx.borrow().clone()
    }

    /// Wait for the next change and return the new snapshot.
    ///
    /// # Errors
    /// Returns `FeedClosed` when the producing store has gone away.
    pub async fn changed(&mut self) -> Result<Arc<Vec<MessageRecord>>, StoreError> {
        self.rx
            .changed()
            .await
            .map_err(|_| StoreError::FeedClosed)?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Stream of snapshots, starting with the current one.
    #[must_use]
    pub fn into_stream(self) -> futures::stream::BoxStream<'static, Arc<Vec<MessageRecord>>> {
        Box::pin(WatchStream::new(self.rx))
    }
}
