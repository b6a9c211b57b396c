//! # SC-02 Access Control
//!
//! The access state machine and the single-active-session invariant.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! Turns raw account-record fields into one of a small set of access states
//! and reacts in real time to administrative changes pushed through
//! `sc-01-change-watcher`: block, license expiry, forced logout, and the
//! duplicate-session eviction that keeps at most one live session per
//! account.
//!
//! ## State machine
//!
//! ```text
//! Unauthenticated → Authorizing → {Active, Blocked, Expired,
//!                                  MustChangeCredential} → Terminated
//! ```
//!
//! `Blocked`, `Expired` and `Terminated` are terminal for the current
//! session; the only recovery is a fresh `authorize` call.
//!
//! ## Module Structure
//!
//! ```text
//! sc-02-access-control/
//! ├── domain/          # AccessState, policy evaluation, errors
//! ├── ports/           # IdentityProvider + TimeSource traits (with mocks)
//! ├── service.rs       # AccessController: session object owning its watch
//! └── config.rs        # AccessConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use config::AccessConfig;
pub use domain::{
    evaluate, exempt_from_policy, AccessError, AccessState, DenyReason, Evaluation,
    TerminationReason,
};
pub use ports::{
    FixedTimeSource, IdentityProvider, MockIdentityProvider, PrincipalId, SystemTimeSource,
    TimeSource,
};
pub use service::AccessController;
