//! # Adapters Layer (Hexagonal Architecture)
//!
//! Concrete [`DocumentStore`] implementations.
//!
//! [`DocumentStore`]: crate::ports::DocumentStore

mod memory;

pub use memory::MemoryDocumentStore;
