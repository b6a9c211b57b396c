//! # In-Memory Document Store
//!
//! [`DocumentStore`] implementation backed by `BTreeMap`s, with per-document
//! broadcast fan-out for watches.
//!
//! Built for the workspace's own tests and for embedding. Carries failure
//! injection switches so fault paths are exercisable without a real outage.

use crate::domain::RawEvent;
use crate::ports::{DocumentStore, MergeSemantics, RawWatch};
use async_trait::async_trait;
use shared_types::{CollectionId, Document, StoreError};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tokio::sync::broadcast;

/// Capacity of each per-document broadcast channel. Lagging receivers skip
/// to fresher snapshots, per the watch contract.
const WATCH_CHANNEL_CAPACITY: usize = 16;

/// In-memory [`DocumentStore`] with watch support and failure injection.
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<CollectionId, BTreeMap<String, Document>>>,
    watchers: RwLock<HashMap<(CollectionId, String), broadcast::Sender<RawEvent>>>,
    failed_collections: RwLock<HashSet<CollectionId>>,
    /// Count of store operations issued (reads, writes, scans, watches).
    ops: AtomicU64,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            watchers: RwLock::new(HashMap::new()),
            failed_collections: RwLock::new(HashSet::new()),
            ops: AtomicU64::new(0),
        }
    }

    /// Mark a collection as unreachable (or reachable again). While failed,
    /// every operation against it returns [`StoreError::Unreachable`].
    pub fn fail_collection(&self, collection: CollectionId, failed: bool) {
        let mut set = self.failed_collections.write().expect("lock poisoned");
        if failed {
            set.insert(collection);
        } else {
            set.remove(&collection);
        }
    }

    /// Sever every open watch, as a connectivity loss would. Each raw
    /// subscription receives `Lost` and then closes; relays are expected to
    /// resubscribe.
    pub fn disconnect_watchers(&self) {
        let mut watchers = self.watchers.write().expect("lock poisoned");
        for sender in watchers.values() {
            let _ = sender.send(RawEvent::Lost("connection reset".into()));
        }
        // Dropping the senders closes the surviving receivers.
        watchers.clear();
    }

    /// Number of store operations issued so far.
    #[must_use]
    pub fn op_count(&self) -> u64 {
        self.ops.load(Ordering::Relaxed)
    }

    fn check_reachable(&self, collection: CollectionId) -> Result<(), StoreError> {
        self.ops.fetch_add(1, Ordering::Relaxed);
        let failed = self.failed_collections.read().expect("lock poisoned");
        if failed.contains(&collection) {
            return Err(StoreError::Unreachable(format!(
                "collection {collection} unavailable (injected)"
            )));
        }
        Ok(())
    }

    fn notify(&self, collection: CollectionId, key: &str, state: Option<Document>) {
        let watchers = self.watchers.read().expect("lock poisoned");
        if let Some(sender) = watchers.get(&(collection, key.to_string())) {
            // No receivers is fine; the next watch() resubscribes fresh.
            let _ = sender.send(RawEvent::Snapshot(state));
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(
        &self,
        collection: CollectionId,
        key: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.check_reachable(collection)?;
        let collections = self.collections.read().expect("lock poisoned");
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn put(
        &self,
        collection: CollectionId,
        key: &str,
        doc: Document,
        merge: MergeSemantics,
    ) -> Result<(), StoreError> {
        self.check_reachable(collection)?;
        let stored = {
            let mut collections = self.collections.write().expect("lock poisoned");
            let docs = collections.entry(collection).or_default();
            let mut stored = match (merge, docs.get(key)) {
                (MergeSemantics::MergeFields, Some(existing)) => {
                    let mut merged = existing.clone();
                    for (field, value) in doc.fields {
                        merged.fields.insert(field, value);
                    }
                    merged
                }
                _ => doc,
            };
            stored.key = key.to_string();
            docs.insert(key.to_string(), stored.clone());
            stored
        };
        self.notify(collection, key, Some(stored));
        Ok(())
    }

    async fn delete(&self, collection: CollectionId, key: &str) -> Result<(), StoreError> {
        self.check_reachable(collection)?;
        let removed = {
            let mut collections = self.collections.write().expect("lock poisoned");
            collections
                .get_mut(&collection)
                .and_then(|docs| docs.remove(key))
                .is_some()
        };
        if removed {
            self.notify(collection, key, None);
        }
        Ok(())
    }

    async fn query_range(
        &self,
        collection: CollectionId,
        field: &str,
        lower: &str,
        upper: &str,
        limit: usize,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_reachable(collection)?;
        let collections = self.collections.read().expect("lock poisoned");
        let Some(docs) = collections.get(&collection) else {
            return Ok(Vec::new());
        };
        let mut hits: Vec<&Document> = docs
            .values()
            .filter(|doc| {
                doc.text(field)
                    .is_some_and(|v| v >= lower && v < upper)
            })
            .collect();
        hits.sort_by_key(|doc| doc.text(field).unwrap_or_default().to_string());
        Ok(hits.into_iter().take(limit).cloned().collect())
    }

    async fn watch(&self, collection: CollectionId, key: &str) -> Result<RawWatch, StoreError> {
        self.check_reachable(collection)?;
        let mut watchers = self.watchers.write().expect("lock poisoned");
        let sender = watchers
            .entry((collection, key.to_string()))
            .or_insert_with(|| broadcast::channel(WATCH_CHANNEL_CAPACITY).0);
        Ok(RawWatch::new(sender.subscribe()))
    }
}
