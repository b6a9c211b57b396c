//! # Domain Module
//!
//! Event types and the backoff policy for watch relays.

pub mod backoff;
pub mod events;

pub use backoff::Backoff;
pub use events::{DocumentEvent, RawEvent};
