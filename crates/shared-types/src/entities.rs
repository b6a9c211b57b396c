//! # Account Entity
//!
//! The authorization-relevant record for one principal, decoded from its
//! raw `accounts` document.
//!
//! Historical baggage lives here and nowhere else: the store carries three
//! differently-named fields that all encode the two-valued license concept,
//! and role text that has drifted across admin tooling generations. Both are
//! normalized once, at [`Account::from_document`], so the policy layer only
//! ever sees the enumerated types.

use crate::documents::{Document, FieldValue};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ACCOUNT FIELD NAMES
// =============================================================================

/// Stored field names for the `accounts` collection.
pub mod fields {
    /// Display name.
    pub const NAME: &str = "name";
    /// Role text (`"root"`, `"staff"`, `"nurse"`, `"admin"`, ...).
    pub const ROLE: &str = "role";
    /// Operational status text (`"active"` / `"blocked"`).
    pub const STATUS: &str = "status";
    /// Legacy license flag, oldest spelling: `true` means active.
    pub const LICENCA: &str = "licenca";
    /// Legacy license flag, middle spelling: `true` means blocked.
    pub const LICENSE_BLOCKED: &str = "license_blocked";
    /// Legacy license text, newest spelling: `"ativa"` / `"bloqueada"`.
    pub const SITUACAO_LICENCA: &str = "situacao_licenca";
    /// Millisecond expiry timestamp; absent means non-expiring.
    pub const EXPIRES_AT: &str = "expires_at";
    /// True until the mandatory first credential change completes.
    pub const FIRST_ACCESS: &str = "first_access";
    /// Opaque token of the one live session; empty when none.
    pub const SESSION_TOKEN: &str = "session_token";
}

// =============================================================================
// ENUMERATED STATES
// =============================================================================

/// Principal role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The bootstrap/superuser identity. Exempt from policy checks.
    Root,
    /// School health staff (nurses and equivalent historical spellings).
    Staff,
    /// Administrative users who manage accounts.
    Admin,
}

impl Role {
    /// Decode stored role text.
    ///
    /// Unknown text maps to `Staff`: a corrupt role field must never grant
    /// the root policy exemption.
    #[must_use]
    pub fn from_stored(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "root" => Self::Root,
            "admin" | "administrator" => Self::Admin,
            _ => Self::Staff,
        }
    }

    /// Stored spelling of this role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }
}

/// Operational status, set by administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationalStatus {
    /// Account may log in.
    Active,
    /// Administratively blocked.
    Blocked,
}

/// License status, derived from the legacy fields plus the expiry stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseStatus {
    /// License valid.
    Active,
    /// License administratively blocked.
    Blocked,
    /// Expiry timestamp is in the past.
    Expired,
}

/// Normalize the three legacy license spellings into one [`LicenseStatus`].
///
/// Precedence among the spellings is fixed (`licenca`, then
/// `license_blocked`, then `situacao_licenca`) so a document carrying more
/// than one resolves deterministically. When none is present the license is
/// treated as active. The expiry stamp overrides either way: a past stamp
/// means `Expired` regardless of what the flags say.
#[must_use]
pub fn license_status_from_fields(doc: &Document, now: DateTime<Utc>) -> LicenseStatus {
    if let Some(ms) = doc.stamp(fields::EXPIRES_AT) {
        if let chrono::LocalResult::Single(expiry) = Utc.timestamp_millis_opt(ms) {
            if expiry < now {
                return LicenseStatus::Expired;
            }
        }
    }

    let blocked = if let Some(active) = doc.flag(fields::LICENCA) {
        !active
    } else if let Some(blocked) = doc.flag(fields::LICENSE_BLOCKED) {
        blocked
    } else if let Some(text) = doc.text(fields::SITUACAO_LICENCA) {
        !text.trim().eq_ignore_ascii_case("ativa")
    } else {
        false
    };

    if blocked {
        LicenseStatus::Blocked
    } else {
        LicenseStatus::Active
    }
}

// =============================================================================
// ACCOUNT
// =============================================================================

/// Decoded account record for one principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Store key of the account document (the principal identifier).
    pub identifier: String,
    /// Display name.
    pub display_name: String,
    /// Principal role.
    pub role: Role,
    /// Operational status.
    pub operational_status: OperationalStatus,
    /// Normalized license status, expiry already folded in.
    pub license_status: LicenseStatus,
    /// Expiry timestamp; `None` means non-expiring.
    pub expires_at: Option<DateTime<Utc>>,
    /// True until the mandatory first credential change completes.
    pub first_access: bool,
    /// Token of the one live session; empty when none.
    pub session_token: String,
}

impl Account {
    /// Decode an account from its stored document.
    ///
    /// This is the single normalization boundary for the legacy license
    /// spellings and loose role text. `now` is needed because the derived
    /// `Expired` state depends on the current time.
    #[must_use]
    pub fn from_document(doc: &Document, now: DateTime<Utc>) -> Self {
        let operational = match doc.text(fields::STATUS) {
            Some(s) if s.trim().eq_ignore_ascii_case("blocked") => OperationalStatus::Blocked,
            _ => OperationalStatus::Active,
        };
        let expires_at = doc.stamp(fields::EXPIRES_AT).and_then(|ms| {
            match Utc.timestamp_millis_opt(ms) {
                chrono::LocalResult::Single(t) => Some(t),
                _ => None,
            }
        });
        Self {
            identifier: doc.key.clone(),
            display_name: doc.text(fields::NAME).unwrap_or_default().to_string(),
            role: Role::from_stored(doc.text(fields::ROLE).unwrap_or_default()),
            operational_status: operational,
            license_status: license_status_from_fields(doc, now),
            expires_at,
            first_access: doc.flag(fields::FIRST_ACCESS).unwrap_or(false),
            session_token: doc
                .text(fields::SESSION_TOKEN)
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Encode this account back into its stored document shape.
    ///
    /// Writes only the current spelling of each concept; the legacy license
    /// aliases are not re-emitted.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new(self.identifier.clone());
        doc.set(fields::NAME, self.display_name.clone());
        doc.set(fields::ROLE, self.role.as_str());
        doc.set(
            fields::STATUS,
            match self.operational_status {
                OperationalStatus::Active => "active",
                OperationalStatus::Blocked => "blocked",
            },
        );
        doc.set(
            fields::LICENCA,
            self.license_status == LicenseStatus::Active,
        );
        if let Some(expiry) = self.expires_at {
            doc.set(
                fields::EXPIRES_AT,
                FieldValue::Stamp(expiry.timestamp_millis()),
            );
        }
        doc.set(fields::FIRST_ACCESS, self.first_access);
        doc.set(fields::SESSION_TOKEN, self.session_token.clone());
        doc
    }

    /// A freshly provisioned account with active, non-expiring defaults.
    ///
    /// Used by the root bootstrap path.
    #[must_use]
    pub fn provisioned(identifier: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
            role,
            operational_status: OperationalStatus::Active,
            license_status: LicenseStatus::Active,
            expires_at: None,
            first_access: false,
            session_token: String::new(),
        }
    }
}
