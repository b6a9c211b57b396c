//! # Identity Provider Port
//!
//! Outbound trait over the hosted identity service. The real provider
//! authenticates credentials and issues/revokes tokens out of band; this
//! core only consumes the three operations below.

use async_trait::async_trait;
use shared_types::AuthError;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Identifier the provider assigns to an authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrincipalId(pub String);

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity provider - outbound port.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check credentials; returns the principal on success.
    async fn authenticate(&self, identifier: &str, secret: &str)
        -> Result<PrincipalId, AuthError>;

    /// Force sign-out of a principal at the provider.
    async fn invalidate(&self, principal: &PrincipalId) -> Result<(), AuthError>;

    /// Change a principal's secret. May demand a recent authentication.
    async fn request_credential_change(
        &self,
        principal: &PrincipalId,
        new_secret: &str,
    ) -> Result<(), AuthError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// Mock identity provider.
#[derive(Default)]
pub struct MockIdentityProvider {
    credentials: RwLock<HashMap<String, String>>,
    invalidated: RwLock<HashSet<String>>,
    /// Should return errors?
    unavailable: RwLock<bool>,
    /// Should credential changes demand recent auth?
    demand_recent_auth: RwLock<bool>,
}

impl MockIdentityProvider {
    /// Empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a credential pair.
    pub fn register(&self, identifier: &str, secret: &str) {
        self.credentials
            .write()
            .expect("lock poisoned")
            .insert(identifier.to_string(), secret.to_string());
    }

    /// Toggle provider unavailability.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().expect("lock poisoned") = unavailable;
    }

    /// Make credential changes fail with `RequiresRecentAuth`.
    pub fn set_demand_recent_auth(&self, demand: bool) {
        *self.demand_recent_auth.write().expect("lock poisoned") = demand;
    }

    /// Whether a principal has been force-signed-out.
    #[must_use]
    pub fn was_invalidated(&self, identifier: &str) -> bool {
        self.invalidated
            .read()
            .expect("lock poisoned")
            .contains(identifier)
    }

    fn check_available(&self) -> Result<(), AuthError> {
        if *self.unavailable.read().expect("lock poisoned") {
            return Err(AuthError::ProviderUnavailable("mock outage".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<PrincipalId, AuthError> {
        self.check_available()?;
        let credentials = self.credentials.read().expect("lock poisoned");
        match credentials.get(identifier) {
            Some(stored) if stored == secret => Ok(PrincipalId(identifier.to_string())),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn invalidate(&self, principal: &PrincipalId) -> Result<(), AuthError> {
        self.check_available()?;
        self.invalidated
            .write()
            .expect("lock poisoned")
            .insert(principal.0.clone());
        Ok(())
    }

    async fn request_credential_change(
        &self,
        principal: &PrincipalId,
        new_secret: &str,
    ) -> Result<(), AuthError> {
        self.check_available()?;
        if *self.demand_recent_auth.read().expect("lock poisoned") {
            return Err(AuthError::RequiresRecentAuth);
        }
        self.credentials
            .write()
            .expect("lock poisoned")
            .insert(principal.0.clone(), new_secret.to_string());
        Ok(())
    }
}
