//! # Document Store Port
//!
//! Outbound trait over the hosted document store. The real service lives
//! outside this workspace; [`MemoryDocumentStore`] implements the same trait
//! for tests and embedding.
//!
//! [`MemoryDocumentStore`]: crate::adapters::MemoryDocumentStore

use crate::domain::RawEvent;
use async_trait::async_trait;
use shared_types::{CollectionId, Document, StoreError};
use tokio::sync::broadcast;
use tracing::debug;

/// Write semantics for [`DocumentStore::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeSemantics {
    /// Replace the whole document.
    Overwrite,
    /// Merge the given fields into the existing document, keeping the rest.
    MergeFields,
}

/// Document store - outbound port.
///
/// All operations are non-blocking; the store's own consistency guarantees
/// are the only cross-client coordination this core relies on. No operation
/// spans more than one document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read. `Ok(None)` means the document does not exist.
    async fn get(
        &self,
        collection: CollectionId,
        key: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// Write a document with the given merge semantics. Last write wins.
    async fn put(
        &self,
        collection: CollectionId,
        key: &str,
        doc: Document,
        merge: MergeSemantics,
    ) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: CollectionId, key: &str) -> Result<(), StoreError>;

    /// Range scan over a field, lexicographic, `[lower, upper)`, capped at
    /// `limit` documents.
    async fn query_range(
        &self,
        collection: CollectionId,
        field: &str,
        lower: &str,
        upper: &str,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError>;

    /// Open a raw per-document subscription.
    ///
    /// The returned handle dies on connectivity loss; resubscription is the
    /// relay's job, not the store's.
    async fn watch(&self, collection: CollectionId, key: &str) -> Result<RawWatch, StoreError>;
}

/// A raw per-document subscription handle.
///
/// Built on a broadcast channel: a lagging receiver skips dropped
/// intermediate states and continues from fresher ones, which matches the
/// "latest state eventually" contract.
pub struct RawWatch {
    receiver: broadcast::Receiver<RawEvent>,
}

impl RawWatch {
    /// Wrap a broadcast receiver into a subscription handle.
    #[must_use]
    pub fn new(receiver: broadcast::Receiver<RawEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next raw event.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - the next event, skipping over any lagged gap
    /// - `None` - the subscription channel closed
    pub async fn next(&mut self) -> Option<RawEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Raw watch lagged, skipping to latest");
                    continue;
                }
            }
        }
    }
}
