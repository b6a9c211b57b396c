//! # Access States
//!
//! The state space of one session's access state machine. Every terminal
//! state maps to exactly one screen in the surrounding application; none of
//! them silently returns the user to an authenticated view.

use serde::{Deserialize, Serialize};

/// Why a session was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The user logged out.
    Logout,
    /// Another login superseded this session's token (eviction). Routes to
    /// login with an explanatory notice.
    DuplicateSession,
    /// No local input events for the configured duration.
    Inactivity,
    /// The principal authenticated but has no provisioned account record,
    /// or the record was deleted mid-session.
    ProfileNotFound,
}

/// Access state of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessState {
    /// No login attempt yet (or the previous one fully unwound).
    Unauthenticated,
    /// Credentials accepted by the identity provider; policy check running.
    Authorizing,
    /// Session live. A watch on the account record runs for its lifetime.
    Active,
    /// Admitted, but the mandatory first credential change is pending.
    /// No session token is minted until it completes.
    MustChangeCredential,
    /// Policy rejection: operational or license block. Dedicated screen.
    Blocked,
    /// Policy rejection: license expiry. Dedicated screen.
    Expired,
    /// Session over; the reason selects the screen and notice.
    Terminated(TerminationReason),
}

impl AccessState {
    /// Whether this state ends the current session. Recovery from a
    /// terminal state is a fresh `authorize` call, nothing else.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Blocked | Self::Expired | Self::Terminated(_))
    }
}

impl std::fmt::Display for AccessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Authorizing => write!(f, "authorizing"),
            Self::Active => write!(f, "active"),
            Self::MustChangeCredential => write!(f, "must-change-credential"),
            Self::Blocked => write!(f, "blocked"),
            Self::Expired => write!(f, "expired"),
            Self::Terminated(TerminationReason::Logout) => write!(f, "terminated(logout)"),
            Self::Terminated(TerminationReason::DuplicateSession) => {
                write!(f, "terminated(duplicate-session)")
            }
            Self::Terminated(TerminationReason::Inactivity) => write!(f, "terminated(inactivity)"),
            Self::Terminated(TerminationReason::ProfileNotFound) => {
                write!(f, "terminated(profile-not-found)")
            }
        }
    }
}
