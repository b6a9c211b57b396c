//! # Domain Module
//!
//! Access states, the policy evaluation rules, and subsystem errors.

pub mod errors;
pub mod policy;
pub mod states;

pub use errors::AccessError;
pub use policy::{evaluate, exempt_from_policy, DenyReason, Evaluation};
pub use states::{AccessState, TerminationReason};
