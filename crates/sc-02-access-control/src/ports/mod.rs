//! # Ports Layer (Hexagonal Architecture)
//!
//! Traits for external dependencies: the identity provider and the clock.
//! Mocks live beside the traits.

pub mod identity;
pub mod time;

pub use identity::{IdentityProvider, MockIdentityProvider, PrincipalId};
pub use time::{FixedTimeSource, SystemTimeSource, TimeSource};
