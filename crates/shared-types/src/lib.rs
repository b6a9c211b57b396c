//! # Shared Types Crate
//!
//! This crate contains the domain types shared by every subsystem of the
//! SchoolCare access-integrity and record-federation core.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **One Normalization Boundary**: the raw store's legacy field spellings
//!   (three differently-named license fields, loosely-typed role text) are
//!   decoded exactly once, in [`Account::from_document`]. No other code
//!   reads the raw spellings.

pub mod documents;
pub mod entities;
pub mod errors;

pub use documents::*;
pub use entities::*;
pub use errors::*;
