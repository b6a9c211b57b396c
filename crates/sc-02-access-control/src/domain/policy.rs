//! # Access Policy
//!
//! The one place account fields become an admit/deny decision. Both the
//! login path and the in-session re-check call [`evaluate`]; the root
//! exemption is the single predicate [`exempt_from_policy`], consulted here
//! and nowhere else.

use shared_types::{Account, LicenseStatus, OperationalStatus, Role};

/// Why an account was denied access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Operational or license block.
    Blocked,
    /// License expiry.
    Expired,
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Admit into an active session.
    Admit,
    /// Admit, but the mandatory first credential change is pending.
    AdmitFirstAccess,
    /// Deny with the given reason.
    Deny(DenyReason),
}

/// The root exemption: root identities bypass the block and expiry checks.
///
/// An explicit authorization override. Every policy check in this subsystem
/// goes through this predicate; no other code tests for `Role::Root`.
#[must_use]
pub fn exempt_from_policy(role: Role) -> bool {
    role == Role::Root
}

/// Evaluate an account against the access rules.
///
/// Block and expiry are checked before the first-access flag, so a blocked
/// account cannot reach the credential-change screen. The account's license
/// status already has the expiry stamp folded in by the normalization
/// boundary in `shared-types`.
#[must_use]
pub fn evaluate(account: &Account) -> Evaluation {
    if !exempt_from_policy(account.role) {
        if account.operational_status == OperationalStatus::Blocked {
            return Evaluation::Deny(DenyReason::Blocked);
        }
        match account.license_status {
            LicenseStatus::Blocked => return Evaluation::Deny(DenyReason::Blocked),
            LicenseStatus::Expired => return Evaluation::Deny(DenyReason::Expired),
            LicenseStatus::Active => {}
        }
    }
    if account.first_access {
        Evaluation::AdmitFirstAccess
    } else {
        Evaluation::Admit
    }
}
