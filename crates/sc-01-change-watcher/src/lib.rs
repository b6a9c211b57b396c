//! # SC-01 Change Watcher
//!
//! Per-document change subscriptions over the hosted document store.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! The store's native `watch` is a raw subscription that dies on any
//! connectivity loss. This crate wraps it into [`ChangeWatcher`]: a relay
//! that delivers [`DocumentEvent`]s, auto-resubscribes with exponential
//! backoff after transient loss, and re-reads the document after every
//! resubscribe so the consumer always converges on the latest state.
//!
//! ## Guarantees
//!
//! - At-least-once delivery of the *latest* state after any mutation. A slow
//!   consumer may miss intermediate states (the underlying channel lags and
//!   skips), never the final one.
//! - Transient loss surfaces as [`DocumentEvent::Unreachable`] and the relay
//!   reconnects on its own; permanent authorization failure is reported once
//!   and the stream ends.
//! - Dropping the [`WatchHandle`] aborts the relay task immediately.
//!
//! ## Module Structure
//!
//! ```text
//! sc-01-change-watcher/
//! ├── domain/          # DocumentEvent, RawEvent, backoff policy
//! ├── ports/           # DocumentStore trait + RawWatch subscription handle
//! ├── adapters/        # MemoryDocumentStore (tests, embedding)
//! ├── watcher.rs       # ChangeWatcher relay + WatchHandle
//! └── config.rs        # WatchConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod watcher;

// Re-exports
pub use adapters::MemoryDocumentStore;
pub use config::WatchConfig;
pub use domain::{Backoff, DocumentEvent, RawEvent};
pub use ports::{DocumentStore, MergeSemantics, RawWatch};
pub use watcher::{ChangeWatcher, WatchHandle};
