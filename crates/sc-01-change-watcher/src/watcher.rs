//! # Change Watcher Relay
//!
//! Turns the store's fragile raw subscription into a self-healing stream of
//! [`DocumentEvent`]s.
//!
//! One relay task per watched document. The task resubscribes with
//! exponential backoff after transient loss and re-reads the document after
//! every successful (re)subscribe, so the consumer converges on the latest
//! state no matter how many events the outage swallowed.

use crate::config::WatchConfig;
use crate::domain::{Backoff, DocumentEvent, RawEvent};
use crate::ports::DocumentStore;
use shared_types::CollectionId;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// Factory for watch relays.
pub struct ChangeWatcher;

impl ChangeWatcher {
    /// Start watching one document.
    ///
    /// Spawns the relay task immediately. The first event the consumer sees
    /// is the document's current state (an `Updated` or `Deleted`), after
    /// which every mutation produces a fresh event.
    pub fn watch<S: DocumentStore + 'static>(
        store: Arc<S>,
        collection: CollectionId,
        key: impl Into<String>,
        config: WatchConfig,
    ) -> WatchHandle {
        let key = key.into();
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        let task = tokio::spawn(relay(store, collection, key, config, tx));
        WatchHandle { receiver: rx, task }
    }
}

/// Consumer handle for one watched document.
///
/// The relay task is owned by this handle: dropping it (or calling
/// [`WatchHandle::cancel`]) aborts the task and releases the underlying
/// subscription immediately. Listener lifetime is therefore scoped to
/// whatever session object holds the handle, never left to collection.
pub struct WatchHandle {
    receiver: mpsc::Receiver<DocumentEvent>,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Receive the next document event.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - the next event
    /// - `None` - the stream ended (permanent failure or cancellation)
    pub async fn recv(&mut self) -> Option<DocumentEvent> {
        self.receiver.recv().await
    }

    /// Stop the relay and release the subscription.
    pub fn cancel(&mut self) {
        self.task.abort();
        self.receiver.close();
    }
}

impl Stream for WatchHandle {
    type Item = DocumentEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The relay loop. Runs until the consumer goes away or the store reports a
/// permanent failure.
async fn relay<S: DocumentStore>(
    store: Arc<S>,
    collection: CollectionId,
    key: String,
    config: WatchConfig,
    tx: mpsc::Sender<DocumentEvent>,
) {
    let mut backoff = Backoff::new(&config);

    'resubscribe: loop {
        // Open (or reopen) the raw subscription, backing off on transient
        // failure. Permanent failure is reported once and ends the stream.
        let mut raw = loop {
            match store.watch(collection, &key).await {
                Ok(raw) => break raw,
                Err(e) if e.is_transient() => {
                    warn!(collection = %collection, key = %key, error = %e, "Watch subscribe failed, retrying");
                    if tx
                        .send(DocumentEvent::Unreachable(e.to_string()))
                        .await
                        .is_err()
                    {
                        return;
                    }
                    tokio::time::sleep(backoff.next_delay()).await;
                }
                Err(e) => {
                    warn!(collection = %collection, key = %key, error = %e, "Watch terminated permanently");
                    let _ = tx.send(DocumentEvent::Unreachable(e.to_string())).await;
                    return;
                }
            }
        };
        backoff.reset();

        // Converge: forward the current state so nothing that happened
        // during the gap is missed.
        match store.get(collection, &key).await {
            Ok(Some(doc)) => {
                if tx.send(DocumentEvent::Updated(doc)).await.is_err() {
                    return;
                }
            }
            Ok(None) => {
                if tx.send(DocumentEvent::Deleted).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                // The subscription itself is up; the next pushed snapshot
                // will carry the state this read failed to fetch.
                warn!(collection = %collection, key = %key, error = %e, "Post-subscribe read failed");
            }
        }

        loop {
            match raw.next().await {
                Some(RawEvent::Snapshot(Some(doc))) => {
                    if tx.send(DocumentEvent::Updated(doc)).await.is_err() {
                        return;
                    }
                }
                Some(RawEvent::Snapshot(None)) => {
                    if tx.send(DocumentEvent::Deleted).await.is_err() {
                        return;
                    }
                }
                Some(RawEvent::Lost(reason)) => {
                    debug!(collection = %collection, key = %key, reason = %reason, "Watch lost, resubscribing");
                    if tx.send(DocumentEvent::Unreachable(reason)).await.is_err() {
                        return;
                    }
                    tokio::time::sleep(backoff.next_delay()).await;
                    continue 'resubscribe;
                }
                None => {
                    debug!(collection = %collection, key = %key, "Watch channel closed, resubscribing");
                    if tx
                        .send(DocumentEvent::Unreachable("subscription closed".into()))
                        .await
                        .is_err()
                    {
                        return;
                    }
                    tokio::time::sleep(backoff.next_delay()).await;
                    continue 'resubscribe;
                }
            }
        }
    }
}
