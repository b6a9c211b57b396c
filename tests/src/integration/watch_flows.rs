//! # Watch Lifecycle Flows
//!
//! Subscription behavior over a live store: initial snapshot, pushed
//! mutations, reconnect convergence after the fan-out drops, and scoped
//! handle lifetime.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::StreamExt;
    use sc_01_change_watcher::{
        ChangeWatcher, DocumentEvent, DocumentStore, MemoryDocumentStore, MergeSemantics,
        WatchConfig,
    };
    use shared_types::{CollectionId, Document};

    async fn put(store: &MemoryDocumentStore, key: &str, doc: Document) {
        store
            .put(CollectionId::Accounts, key, doc, MergeSemantics::Overwrite)
            .await
            .unwrap();
    }

    async fn next_event(
        handle: &mut sc_01_change_watcher::WatchHandle,
    ) -> Option<DocumentEvent> {
        tokio::time::timeout(Duration::from_secs(2), handle.recv())
            .await
            .expect("timed out waiting for watch event")
    }

    #[tokio::test]
    async fn test_watch_delivers_snapshot_then_mutations() {
        let store = Arc::new(MemoryDocumentStore::new());
        put(&store, "ana", Document::new("ana").with("status", "active")).await;

        let mut handle = ChangeWatcher::watch(
            store.clone(),
            CollectionId::Accounts,
            "ana",
            WatchConfig::for_testing(),
        );

        // First event is the current state.
        match next_event(&mut handle).await {
            Some(DocumentEvent::Updated(doc)) => {
                assert_eq!(doc.text("status"), Some("active"));
            }
            other => panic!("expected initial snapshot, got {other:?}"),
        }

        put(&store, "ana", Document::new("ana").with("status", "blocked")).await;
        match next_event(&mut handle).await {
            Some(DocumentEvent::Updated(doc)) => {
                assert_eq!(doc.text("status"), Some("blocked"));
            }
            other => panic!("expected pushed update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_watch_reports_deletion() {
        let store = Arc::new(MemoryDocumentStore::new());
        put(&store, "ana", Document::new("ana")).await;

        let mut handle = ChangeWatcher::watch(
            store.clone(),
            CollectionId::Accounts,
            "ana",
            WatchConfig::for_testing(),
        );
        assert!(matches!(
            next_event(&mut handle).await,
            Some(DocumentEvent::Updated(_))
        ));

        store.delete(CollectionId::Accounts, "ana").await.unwrap();
        assert!(matches!(
            next_event(&mut handle).await,
            Some(DocumentEvent::Deleted)
        ));
    }

    #[tokio::test]
    async fn test_watch_resubscribes_and_converges_after_disconnect() {
        let store = Arc::new(MemoryDocumentStore::new());
        put(&store, "ana", Document::new("ana").with("status", "active")).await;

        let mut handle = ChangeWatcher::watch(
            store.clone(),
            CollectionId::Accounts,
            "ana",
            WatchConfig::for_testing(),
        );
        assert!(matches!(
            next_event(&mut handle).await,
            Some(DocumentEvent::Updated(_))
        ));

        // Drop every fan-out sender, then mutate while nobody is attached.
        store.disconnect_watchers();
        put(&store, "ana", Document::new("ana").with("status", "blocked")).await;

        // The relay surfaces the outage, resubscribes, and converges on
        // the state it missed.
        let mut saw_unreachable = false;
        loop {
            match next_event(&mut handle).await {
                Some(DocumentEvent::Unreachable(_)) => saw_unreachable = true,
                Some(DocumentEvent::Updated(doc)) => {
                    assert_eq!(doc.text("status"), Some("blocked"));
                    break;
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert!(saw_unreachable);
    }

    #[tokio::test]
    async fn test_cancel_ends_the_stream() {
        let store = Arc::new(MemoryDocumentStore::new());
        put(&store, "ana", Document::new("ana")).await;

        let mut handle = ChangeWatcher::watch(
            store.clone(),
            CollectionId::Accounts,
            "ana",
            WatchConfig::for_testing(),
        );
        assert!(matches!(
            next_event(&mut handle).await,
            Some(DocumentEvent::Updated(_))
        ));

        handle.cancel();
        assert!(next_event(&mut handle).await.is_none());
    }

    #[tokio::test]
    async fn test_handle_is_a_stream() {
        let store = Arc::new(MemoryDocumentStore::new());
        put(&store, "ana", Document::new("ana").with("status", "active")).await;

        let mut handle = ChangeWatcher::watch(
            store.clone(),
            CollectionId::Accounts,
            "ana",
            WatchConfig::for_testing(),
        );
        let event = tokio::time::timeout(Duration::from_secs(2), handle.next())
            .await
            .expect("timed out");
        assert!(matches!(event, Some(DocumentEvent::Updated(_))));
    }
}
