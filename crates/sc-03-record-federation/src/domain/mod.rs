//! # Domain Module
//!
//! Key derivation, source precedence, merge rules, and errors.

pub mod errors;
pub mod keys;
pub mod merge;
pub mod sources;

pub use errors::FederationError;
pub use keys::{normalize_name, PersonKey, MIN_PREFIX_LEN};
pub use merge::{compute_bmi, consolidate, Candidate, ConsolidatedRecord, VisitSummary};
pub use sources::{record_fields, Source};
