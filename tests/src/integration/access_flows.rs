//! # Access Control Flows
//!
//! End-to-end session lifecycle over a shared store: two clients racing
//! for the single session slot, mid-session policy re-checks pushed
//! through live watches, the root exemption, and the first-access
//! credential change.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use sc_01_change_watcher::{DocumentStore, MemoryDocumentStore, MergeSemantics};
    use sc_02_access_control::{
        AccessConfig, AccessController, AccessError, AccessState, DenyReason, FixedTimeSource,
        MockIdentityProvider, TerminationReason,
    };
    use shared_types::{fields, CollectionId, Document, FieldValue};
    use tokio::sync::watch;

    const NOW_MS: i64 = 1_700_000_000_000;

    struct Cluster {
        store: Arc<MemoryDocumentStore>,
        clock: Arc<FixedTimeSource>,
    }

    impl Cluster {
        fn new() -> Self {
            Self {
                store: Arc::new(MemoryDocumentStore::new()),
                clock: Arc::new(FixedTimeSource::at_millis(NOW_MS)),
            }
        }

        /// One client: its own controller and identity provider, sharing
        /// the cluster's store.
        fn client(&self) -> AccessController<MemoryDocumentStore, MockIdentityProvider> {
            let identity = MockIdentityProvider::new();
            identity.register("ana", "s3cret");
            identity.register("root", "master");
            AccessController::new(
                self.store.clone(),
                identity,
                self.clock.clone(),
                AccessConfig::for_testing(),
            )
        }

        async fn provision(&self, identifier: &str, doc: Document) {
            self.store
                .put(
                    CollectionId::Accounts,
                    identifier,
                    doc,
                    MergeSemantics::Overwrite,
                )
                .await
                .unwrap();
        }

        async fn patch(&self, identifier: &str, field: &str, value: FieldValue) {
            let mut doc = Document::new(identifier);
            doc.set(field, value);
            self.store
                .put(
                    CollectionId::Accounts,
                    identifier,
                    doc,
                    MergeSemantics::MergeFields,
                )
                .await
                .unwrap();
        }

        async fn stored_token(&self, identifier: &str) -> String {
            self.store
                .get(CollectionId::Accounts, identifier)
                .await
                .unwrap()
                .unwrap()
                .text(fields::SESSION_TOKEN)
                .unwrap_or_default()
                .to_string()
        }
    }

    fn staff_doc(identifier: &str) -> Document {
        Document::new(identifier)
            .with(fields::NAME, "Ana Souza")
            .with(fields::ROLE, "staff")
            .with(fields::STATUS, "active")
    }

    fn root_doc() -> Document {
        Document::new("root")
            .with(fields::NAME, "Root")
            .with(fields::ROLE, "root")
    }

    async fn await_state(rx: &mut watch::Receiver<AccessState>, wanted: AccessState) {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if *rx.borrow() == wanted {
                    return;
                }
                rx.changed().await.expect("state channel closed");
            }
        })
        .await
        .expect("timed out waiting for state");
    }

    // =========================================================================
    // SINGLE-SESSION INVARIANT
    // =========================================================================

    #[tokio::test]
    async fn test_second_login_evicts_first_client() {
        let cluster = Cluster::new();
        cluster.provision("ana", staff_doc("ana")).await;

        let first = cluster.client();
        first.authorize("ana", "s3cret").await.unwrap();
        let first_token = cluster.stored_token("ana").await;
        let mut first_states = first.state_changes();

        let second = cluster.client();
        second.authorize("ana", "s3cret").await.unwrap();

        // The stale client loses by token comparison, after the new token
        // is already in place.
        await_state(
            &mut first_states,
            AccessState::Terminated(TerminationReason::DuplicateSession),
        )
        .await;
        assert_ne!(cluster.stored_token("ana").await, first_token);
        assert_eq!(second.current_state(), AccessState::Active);
    }

    #[tokio::test]
    async fn test_stale_logout_does_not_erase_successor_token() {
        let cluster = Cluster::new();
        cluster.provision("ana", staff_doc("ana")).await;

        let first = cluster.client();
        first.authorize("ana", "s3cret").await.unwrap();
        let mut first_states = first.state_changes();

        let second = cluster.client();
        second.authorize("ana", "s3cret").await.unwrap();
        await_state(
            &mut first_states,
            AccessState::Terminated(TerminationReason::DuplicateSession),
        )
        .await;
        let successor_token = cluster.stored_token("ana").await;

        // The evicted client logging out must not vacate the slot the
        // successor now holds.
        first.logout().await;
        assert_eq!(cluster.stored_token("ana").await, successor_token);
    }

    // =========================================================================
    // MID-SESSION POLICY RE-CHECKS
    // =========================================================================

    #[tokio::test]
    async fn test_block_written_mid_session_evicts() {
        let cluster = Cluster::new();
        cluster.provision("ana", staff_doc("ana")).await;

        let client = cluster.client();
        client.authorize("ana", "s3cret").await.unwrap();
        let mut states = client.state_changes();

        cluster
            .patch("ana", fields::STATUS, FieldValue::Text("blocked".into()))
            .await;
        await_state(&mut states, AccessState::Blocked).await;
    }

    #[tokio::test]
    async fn test_expiry_written_mid_session_evicts() {
        let cluster = Cluster::new();
        cluster.provision("ana", staff_doc("ana")).await;

        let client = cluster.client();
        client.authorize("ana", "s3cret").await.unwrap();
        let mut states = client.state_changes();

        cluster
            .patch("ana", fields::EXPIRES_AT, FieldValue::Stamp(NOW_MS - 1))
            .await;
        await_state(&mut states, AccessState::Expired).await;
    }

    #[tokio::test]
    async fn test_legacy_license_flag_written_mid_session_evicts() {
        let cluster = Cluster::new();
        cluster.provision("ana", staff_doc("ana")).await;

        let client = cluster.client();
        client.authorize("ana", "s3cret").await.unwrap();
        let mut states = client.state_changes();

        // Oldest spelling: `licenca: false` means the license is revoked.
        cluster
            .patch("ana", fields::LICENCA, FieldValue::Flag(false))
            .await;
        await_state(&mut states, AccessState::Blocked).await;
    }

    #[tokio::test]
    async fn test_profile_deletion_mid_session_terminates() {
        let cluster = Cluster::new();
        cluster.provision("ana", staff_doc("ana")).await;

        let client = cluster.client();
        client.authorize("ana", "s3cret").await.unwrap();
        let mut states = client.state_changes();

        cluster
            .store
            .delete(CollectionId::Accounts, "ana")
            .await
            .unwrap();
        await_state(
            &mut states,
            AccessState::Terminated(TerminationReason::ProfileNotFound),
        )
        .await;
    }

    // =========================================================================
    // ROOT EXEMPTION
    // =========================================================================

    #[tokio::test]
    async fn test_root_survives_duplicate_token_and_block_writes() {
        let cluster = Cluster::new();
        cluster.provision("root", root_doc()).await;

        let client = cluster.client();
        client.authorize("root", "master").await.unwrap();

        cluster
            .patch(
                "root",
                fields::SESSION_TOKEN,
                FieldValue::Text("someone-else".into()),
            )
            .await;
        cluster
            .patch("root", fields::STATUS, FieldValue::Text("blocked".into()))
            .await;

        // Give the watch loop time to see both writes and ignore them.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(client.current_state(), AccessState::Active);
    }

    #[tokio::test]
    async fn test_root_bootstrap_provisions_missing_account() {
        let cluster = Cluster::new();
        // No account document exists for "root".
        let client = cluster.client();

        let state = client.authorize("root", "master").await.unwrap();
        assert_eq!(state, AccessState::Active);

        let doc = cluster
            .store
            .get(CollectionId::Accounts, "root")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.text(fields::ROLE), Some("root"));
    }

    // =========================================================================
    // LOGIN POLICY AND FIRST ACCESS
    // =========================================================================

    #[tokio::test]
    async fn test_blocked_account_denied_at_login() {
        let cluster = Cluster::new();
        cluster
            .provision("ana", staff_doc("ana").with(fields::STATUS, "blocked"))
            .await;

        let client = cluster.client();
        let err = client.authorize("ana", "s3cret").await.unwrap_err();
        assert_eq!(err, AccessError::Denied(DenyReason::Blocked));
        assert_eq!(client.current_state(), AccessState::Blocked);
        // No token was minted for a denied login.
        assert!(cluster.stored_token("ana").await.is_empty());
    }

    #[tokio::test]
    async fn test_first_access_flow_ends_active() {
        let cluster = Cluster::new();
        cluster
            .provision("ana", staff_doc("ana").with(fields::FIRST_ACCESS, true))
            .await;

        let client = cluster.client();
        let state = client.authorize("ana", "s3cret").await.unwrap();
        assert_eq!(state, AccessState::MustChangeCredential);
        // The pending session holds no token yet.
        assert!(cluster.stored_token("ana").await.is_empty());

        let state = client.complete_credential_change("n3w-s3cret").await.unwrap();
        assert_eq!(state, AccessState::Active);
        assert!(!cluster.stored_token("ana").await.is_empty());

        let doc = cluster
            .store
            .get(CollectionId::Accounts, "ana")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.flag(fields::FIRST_ACCESS), Some(false));
    }
}
