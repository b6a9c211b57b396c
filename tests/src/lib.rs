//! # SchoolCare Core Test Suite
//!
//! Unified test crate for cross-crate flows the per-crate unit tests
//! cannot cover: two controllers racing over one store, federation against
//! a store shared with live watchers, eviction ordering end to end.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-crate choreography
//!     ├── watch_flows.rs       # Subscription lifecycle over a live store
//!     ├── access_flows.rs      # Login, eviction, policy re-check flows
//!     └── federation_flows.rs  # Resolution and search across collections
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sc-tests
//!
//! # By category
//! cargo test -p sc-tests integration::access_flows
//! cargo test -p sc-tests integration::federation_flows
//!
//! # Benchmarks
//! cargo bench -p sc-tests
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
