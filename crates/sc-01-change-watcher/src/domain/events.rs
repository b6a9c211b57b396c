//! # Watch Events
//!
//! Two layers of event: [`RawEvent`] is what the store's native subscription
//! yields; [`DocumentEvent`] is what consumers of [`ChangeWatcher`] see after
//! the relay has folded in resubscription.
//!
//! [`ChangeWatcher`]: crate::watcher::ChangeWatcher

use shared_types::Document;

/// Event from the store's native per-document subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    /// The document's current state: `Some` after a create/update, `None`
    /// after a delete. The store pushes the full snapshot, not a delta.
    Snapshot(Option<Document>),

    /// The subscription was lost (connectivity, server-side reset). The
    /// relay resubscribes; consumers never see this variant directly.
    Lost(String),
}

/// Event delivered to [`WatchHandle`] consumers.
///
/// [`WatchHandle`]: crate::watcher::WatchHandle
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    /// The document changed (or a resubscribe re-read its current state).
    Updated(Document),

    /// The document was deleted or became unreadable.
    Deleted,

    /// The subscription is temporarily down. Informational: the relay is
    /// already reconnecting with backoff, unless this is the final event
    /// before the stream ends (permanent authorization failure).
    Unreachable(String),
}
