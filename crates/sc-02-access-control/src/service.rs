//! # Access Controller
//!
//! The session object. One instance per client; the only cross-client
//! coordination point is the account document's `session_token` field,
//! mediated entirely by the store's own last-write-wins consistency.
//!
//! While a session is `Active` the controller holds a change watch on the
//! account record and re-evaluates policy on every pushed snapshot; it can
//! unilaterally terminate the session mid-use (block, expiry, eviction).
//! The watch and the inactivity timer are tasks owned by the session and
//! aborted deterministically on logout, eviction, or drop.
//!
//! Known staleness window: eviction is detected client-side by comparing
//! the pushed token against the cached one, so an evicted client that has
//! gone offline never vacates the `session_token` slot. Its replacement
//! overwrites the slot anyway, which is all the single-session invariant
//! requires.

use crate::config::AccessConfig;
use crate::domain::{
    evaluate, exempt_from_policy, AccessError, AccessState, DenyReason, Evaluation,
    TerminationReason,
};
use crate::ports::{IdentityProvider, PrincipalId, TimeSource};
use sc_01_change_watcher::{ChangeWatcher, DocumentEvent, DocumentStore, MergeSemantics, WatchHandle};
use shared_types::{fields, Account, CollectionId, Document, Role};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One live (or pending) session's resources.
struct Session {
    identifier: String,
    principal: PrincipalId,
    /// Cached session token; empty while the mandatory credential change
    /// is still pending.
    token: String,
    watch_task: Option<JoinHandle<()>>,
    inactivity_task: Option<JoinHandle<()>>,
    last_activity: Arc<RwLock<Instant>>,
}

impl Session {
    fn abort_tasks(&mut self) {
        if let Some(task) = self.watch_task.take() {
            task.abort();
        }
        if let Some(task) = self.inactivity_task.take() {
            task.abort();
        }
    }
}

/// Access state machine for one client.
pub struct AccessController<S: DocumentStore + 'static, I: IdentityProvider> {
    store: Arc<S>,
    identity: I,
    time: Arc<dyn TimeSource>,
    config: AccessConfig,
    state_tx: watch::Sender<AccessState>,
    state_rx: watch::Receiver<AccessState>,
    session: Mutex<Option<Session>>,
    /// Bumped on every login and logout. Session-owned tasks stamp state
    /// transitions only while their epoch is current, so a task preempted
    /// across a successor login cannot write a stale terminal state.
    session_epoch: Arc<AtomicU64>,
}

impl<S: DocumentStore + 'static, I: IdentityProvider> AccessController<S, I> {
    /// Create a controller in the `Unauthenticated` state.
    pub fn new(store: Arc<S>, identity: I, time: Arc<dyn TimeSource>, config: AccessConfig) -> Self {
        let (state_tx, state_rx) = watch::channel(AccessState::Unauthenticated);
        Self {
            store,
            identity,
            time,
            config,
            state_tx,
            state_rx,
            session: Mutex::new(None),
            session_epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current access state. Polled by the UI to render the blocked,
    /// expired, and terminated screens.
    #[must_use]
    pub fn current_state(&self) -> AccessState {
        *self.state_rx.borrow()
    }

    /// Subscribe to state transitions.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<AccessState> {
        self.state_rx.clone()
    }

    /// Attempt a login.
    ///
    /// On success the session is `Active` (or `MustChangeCredential` when
    /// the mandatory first credential change is pending). Policy denials
    /// come back as [`AccessError::Denied`] with the state cell already set
    /// to the matching `Blocked`/`Expired` screen state.
    pub async fn authorize(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<AccessState, AccessError> {
        let mut session = self.session.lock().await;
        // Supersede before aborting: a leftover task that already received
        // its event cannot stamp a terminal state past this point.
        self.session_epoch.fetch_add(1, Ordering::AcqRel);
        if let Some(previous) = session.as_mut() {
            previous.abort_tasks();
        }
        *session = None;
        self.state_tx.send_replace(AccessState::Authorizing);

        let principal = match self.identity.authenticate(identifier, secret).await {
            Ok(principal) => principal,
            Err(e) => {
                self.state_tx.send_replace(AccessState::Unauthenticated);
                return Err(e.into());
            }
        };

        let account = match self.load_or_bootstrap(identifier).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                // Authenticated but never provisioned: fatal for this
                // session, and the provider-side sign-in is revoked too.
                if let Err(e) = self.identity.invalidate(&principal).await {
                    warn!(identifier, error = %e, "Failed to invalidate unprovisioned principal");
                }
                self.state_tx
                    .send_replace(AccessState::Terminated(TerminationReason::ProfileNotFound));
                return Err(AccessError::ProfileNotFound);
            }
            Err(e) => {
                self.state_tx.send_replace(AccessState::Unauthenticated);
                return Err(e);
            }
        };

        match evaluate(&account) {
            Evaluation::Deny(DenyReason::Blocked) => {
                info!(identifier, "Login denied: blocked");
                self.state_tx.send_replace(AccessState::Blocked);
                Err(AccessError::Denied(DenyReason::Blocked))
            }
            Evaluation::Deny(DenyReason::Expired) => {
                info!(identifier, "Login denied: license expired");
                self.state_tx.send_replace(AccessState::Expired);
                Err(AccessError::Denied(DenyReason::Expired))
            }
            Evaluation::AdmitFirstAccess => {
                *session = Some(Session {
                    identifier: identifier.to_string(),
                    principal,
                    token: String::new(),
                    watch_task: None,
                    inactivity_task: None,
                    last_activity: Arc::new(RwLock::new(Instant::now())),
                });
                self.state_tx.send_replace(AccessState::MustChangeCredential);
                Ok(AccessState::MustChangeCredential)
            }
            Evaluation::Admit => self.enter_active(&mut session, identifier, principal).await,
        }
    }

    /// Finish the mandatory first credential change and enter `Active`.
    pub async fn complete_credential_change(
        &self,
        new_secret: &str,
    ) -> Result<AccessState, AccessError> {
        let mut session = self.session.lock().await;
        if self.current_state() != AccessState::MustChangeCredential {
            return Err(AccessError::InvalidState("not awaiting a credential change"));
        }
        let (identifier, principal) = match session.as_ref() {
            Some(pending) => (pending.identifier.clone(), pending.principal.clone()),
            None => return Err(AccessError::InvalidState("no pending session")),
        };

        self.identity
            .request_credential_change(&principal, new_secret)
            .await?;
        let mut patch = Document::new(identifier.clone());
        patch.set(fields::FIRST_ACCESS, false);
        self.store
            .put(
                CollectionId::Accounts,
                &identifier,
                patch,
                MergeSemantics::MergeFields,
            )
            .await?;

        self.enter_active(&mut session, &identifier, principal).await
    }

    /// Bump the inactivity deadline. The surrounding application calls
    /// this on user input events.
    pub async fn record_activity(&self) {
        let session = self.session.lock().await;
        if let Some(live) = session.as_ref() {
            *live.last_activity.write().expect("lock poisoned") = Instant::now();
        }
    }

    /// End the session locally and vacate the token slot, but only when it
    /// still holds this session's token. A logout racing a successor login
    /// must never erase the successor's token.
    pub async fn logout(&self) {
        let mut session = self.session.lock().await;
        self.session_epoch.fetch_add(1, Ordering::AcqRel);
        if let Some(mut live) = session.take() {
            live.abort_tasks();
            if !live.token.is_empty() {
                match self.store.get(CollectionId::Accounts, &live.identifier).await {
                    Ok(Some(doc))
                        if doc.text(fields::SESSION_TOKEN) == Some(live.token.as_str()) =>
                    {
                        let mut patch = Document::new(live.identifier.clone());
                        patch.set(fields::SESSION_TOKEN, "");
                        if let Err(e) = self
                            .store
                            .put(
                                CollectionId::Accounts,
                                &live.identifier,
                                patch,
                                MergeSemantics::MergeFields,
                            )
                            .await
                        {
                            // Local termination proceeds regardless; the
                            // stale token falls inside the documented
                            // staleness window.
                            warn!(identifier = %live.identifier, error = %e, "Logout could not vacate token slot");
                        }
                    }
                    Ok(_) => {
                        debug!(identifier = %live.identifier, "Token already superseded, leaving slot alone");
                    }
                    Err(e) => {
                        warn!(identifier = %live.identifier, error = %e, "Logout could not read account");
                    }
                }
            }
        }
        self.state_tx
            .send_replace(AccessState::Terminated(TerminationReason::Logout));
    }

    async fn load_or_bootstrap(&self, identifier: &str) -> Result<Option<Account>, AccessError> {
        let now = self.time.now();
        if let Some(doc) = self.store.get(CollectionId::Accounts, identifier).await? {
            return Ok(Some(Account::from_document(&doc, now)));
        }
        if identifier == self.config.bootstrap_root {
            // The single bootstrap special case: the designated root
            // identity gets an account with active, non-expiring defaults.
            info!(identifier, "Bootstrapping root account");
            let account = Account::provisioned(identifier, identifier, Role::Root);
            self.store
                .put(
                    CollectionId::Accounts,
                    identifier,
                    account.to_document(),
                    MergeSemantics::Overwrite,
                )
                .await?;
            return Ok(Some(account));
        }
        Ok(None)
    }

    /// Mint a token, claim the slot, start the watch and inactivity tasks.
    async fn enter_active(
        &self,
        session: &mut Option<Session>,
        identifier: &str,
        principal: PrincipalId,
    ) -> Result<AccessState, AccessError> {
        let token = Uuid::new_v4().to_string();
        let mut patch = Document::new(identifier);
        patch.set(fields::SESSION_TOKEN, token.clone());
        // Last write wins; only the freshly-authenticated client writes
        // this field at this instant, so no transaction is needed.
        self.store
            .put(
                CollectionId::Accounts,
                identifier,
                patch,
                MergeSemantics::MergeFields,
            )
            .await?;

        let handle = ChangeWatcher::watch(
            self.store.clone(),
            CollectionId::Accounts,
            identifier,
            self.config.watch.clone(),
        );
        let epoch = self.session_epoch.load(Ordering::Acquire);
        let watch_task = tokio::spawn(watch_loop(
            handle,
            token.clone(),
            self.time.clone(),
            self.state_tx.clone(),
            epoch,
            self.session_epoch.clone(),
        ));

        let last_activity = Arc::new(RwLock::new(Instant::now()));
        let inactivity_task = tokio::spawn(inactivity_loop(
            last_activity.clone(),
            self.config.inactivity_timeout(),
            self.state_tx.clone(),
            epoch,
            self.session_epoch.clone(),
        ));

        *session = Some(Session {
            identifier: identifier.to_string(),
            principal,
            token,
            watch_task: Some(watch_task),
            inactivity_task: Some(inactivity_task),
            last_activity,
        });
        info!(identifier, "Session active");
        self.state_tx.send_replace(AccessState::Active);
        Ok(AccessState::Active)
    }
}

impl<S: DocumentStore + 'static, I: IdentityProvider> Drop for AccessController<S, I> {
    fn drop(&mut self) {
        if let Ok(mut session) = self.session.try_lock() {
            if let Some(live) = session.as_mut() {
                live.abort_tasks();
            }
        }
    }
}

/// Apply a session-scoped state transition.
///
/// The epoch check runs inside the channel lock, so a task preempted
/// between receiving its event and writing the transition drops the write
/// once its session has been superseded by a newer login or logout.
fn stamp(
    state_tx: &watch::Sender<AccessState>,
    epochs: &AtomicU64,
    epoch: u64,
    next: AccessState,
) {
    state_tx.send_if_modified(|state| {
        if epochs.load(Ordering::Acquire) != epoch {
            return false;
        }
        *state = next;
        true
    });
}

/// In-session re-check loop: every pushed snapshot of the account record is
/// re-evaluated against the same policy that admitted the login.
async fn watch_loop(
    mut handle: WatchHandle,
    token: String,
    time: Arc<dyn TimeSource>,
    state_tx: watch::Sender<AccessState>,
    epoch: u64,
    epochs: Arc<AtomicU64>,
) {
    while let Some(event) = handle.recv().await {
        if state_tx.borrow().is_terminal() {
            return;
        }
        match event {
            DocumentEvent::Updated(doc) => {
                let account = Account::from_document(&doc, time.now());
                if exempt_from_policy(account.role) {
                    continue;
                }
                match evaluate(&account) {
                    Evaluation::Deny(DenyReason::Blocked) => {
                        warn!(identifier = %account.identifier, "Evicting session: account blocked");
                        stamp(&state_tx, &epochs, epoch, AccessState::Blocked);
                        return;
                    }
                    Evaluation::Deny(DenyReason::Expired) => {
                        warn!(identifier = %account.identifier, "Evicting session: license expired");
                        stamp(&state_tx, &epochs, epoch, AccessState::Expired);
                        return;
                    }
                    Evaluation::Admit | Evaluation::AdmitFirstAccess => {
                        if account.session_token != token {
                            // The losing side of a second login. Fired here,
                            // on the stale client, by token comparison.
                            info!(identifier = %account.identifier, "Evicting session: duplicate session");
                            stamp(
                                &state_tx,
                                &epochs,
                                epoch,
                                AccessState::Terminated(TerminationReason::DuplicateSession),
                            );
                            return;
                        }
                    }
                }
            }
            DocumentEvent::Deleted => {
                warn!("Evicting session: account record deleted");
                stamp(
                    &state_tx,
                    &epochs,
                    epoch,
                    AccessState::Terminated(TerminationReason::ProfileNotFound),
                );
                return;
            }
            DocumentEvent::Unreachable(reason) => {
                // The relay reconnects underneath; a stale eviction check is
                // an acceptable false negative because the client's next
                // write is stopped at the store anyway.
                debug!(reason = %reason, "Account watch temporarily unreachable");
            }
        }
    }
}

/// Local inactivity timer: `Active -> Terminated(Inactivity)` after the
/// configured quiet period, independent of server-pushed events.
async fn inactivity_loop(
    last_activity: Arc<RwLock<Instant>>,
    timeout: std::time::Duration,
    state_tx: watch::Sender<AccessState>,
    epoch: u64,
    epochs: Arc<AtomicU64>,
) {
    loop {
        if state_tx.borrow().is_terminal() {
            return;
        }
        let deadline = *last_activity.read().expect("lock poisoned") + timeout;
        if Instant::now() >= deadline {
            info!("Terminating session: inactivity");
            stamp(
                &state_tx,
                &epochs,
                epoch,
                AccessState::Terminated(TerminationReason::Inactivity),
            );
            return;
        }
        tokio::time::sleep_until(deadline).await;
    }
}
