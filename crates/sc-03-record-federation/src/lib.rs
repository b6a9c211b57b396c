//! # SC-03 Record Federation
//!
//! Resolves a single person by merging partial, redundantly-stored records
//! scattered across independently-updated collections.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! A person's data is split over a profile record, a structured health
//! questionnaire, a legacy registry, and visit logs, each with its own CRUD
//! lifecycle. [`RecordFederator`] assembles one consolidated view on demand
//! under a fixed source-precedence policy, and offers an incremental
//! prefix-search across the same collections for autocomplete.
//!
//! ## Rules that never vary
//!
//! - One canonical key derivation: [`PersonKey::derive`].
//! - One canonical precedence order: [`Source::PRECEDENCE`]
//!   (profile folder > structured questionnaire > legacy registry >
//!   visit-derived). Conflicts resolve by precedence, never by recency.
//! - A failing source degrades to an empty contribution; only all sources
//!   failing is an error, and it is [`FederationError::Unavailable`],
//!   distinct from [`FederationError::NotFound`].
//!
//! ## Module Structure
//!
//! ```text
//! sc-03-record-federation/
//! ├── domain/          # keys, sources, merge rules, errors
//! ├── service.rs       # RecordFederator: resolve_person + search_by_prefix
//! └── config.rs        # FederationConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod service;

// Re-exports
pub use config::FederationConfig;
pub use domain::{
    compute_bmi, consolidate, normalize_name, Candidate, ConsolidatedRecord, FederationError,
    PersonKey, Source, VisitSummary, MIN_PREFIX_LEN,
};
pub use service::RecordFederator;
