//! # Ports Layer (Hexagonal Architecture)
//!
//! The document store trait consumed by every subsystem, and the raw
//! subscription handle its `watch` operation returns.

pub mod store;

pub use store::{DocumentStore, MergeSemantics, RawWatch};
