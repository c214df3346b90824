//! Route guards.
//!
//! Guards are pure decisions over an auth state snapshot: the caller asks
//! whether a path may render and acts on the answer. While the one-time
//! session restore is still running every routing guard answers `Pending`,
//! which prevents a flash redirect to the login screen on startup.

use crate::auth::context::AuthState;
use crate::auth::models::Role;
use crate::routes;

/// What a routing guard wants done with a requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session restore has not finished. Show a neutral placeholder.
    Pending,
    /// Render the requested content.
    Admit,
    /// Go somewhere else instead. `return_to` carries the originally
    /// requested location when it should be revisited after login.
    Redirect {
        to: String,
        return_to: Option<String>,
    },
}

/// Admits only signed-in users whose role is in the allowed set.
///
/// Outsiders with a valid session are bounced to their own section home,
/// never to a generic forbidden page.
pub struct AuthRequiredGuard {
    allowed_roles: Vec<Role>,
}

impl AuthRequiredGuard {
    pub fn new(allowed_roles: impl Into<Vec<Role>>) -> Self {
        AuthRequiredGuard {
            allowed_roles: allowed_roles.into(),
        }
    }

    pub fn decide(&self, state: &AuthState, requested_path: &str) -> GuardDecision {
        if !state.is_initialized {
            return GuardDecision::Pending;
        }

        match &state.user {
            None => GuardDecision::Redirect {
                to: routes::LOGIN_PATH.to_string(),
                return_to: Some(requested_path.to_string()),
            },
            Some(user) if self.allowed_roles.contains(&user.role) => GuardDecision::Admit,
            Some(user) => GuardDecision::Redirect {
                to: routes::home_path(user.role).to_string(),
                return_to: None,
            },
        }
    }
}

/// Admits only anonymous visitors; signed-in users go straight to their
/// section home. Used on the login and registration screens.
pub struct GuestOnlyGuard;

impl GuestOnlyGuard {
    pub fn decide(&self, state: &AuthState) -> GuardDecision {
        if !state.is_initialized {
            return GuardDecision::Pending;
        }

        match &state.user {
            Some(user) => GuardDecision::Redirect {
                to: routes::home_path(user.role).to_string(),
                return_to: None,
            },
            None => GuardDecision::Admit,
        }
    }
}

/// Whether a role-gated UI fragment is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Shown,
    Hidden,
}

/// Hides a fragment inside an otherwise-shared view unless the current role
/// is in the allowed set. Unlike the routing guards it never redirects and
/// shows nothing at all while state is still pending.
pub struct RoleGate {
    allowed_roles: Vec<Role>,
}

impl RoleGate {
    pub fn new(allowed_roles: impl Into<Vec<Role>>) -> Self {
        RoleGate {
            allowed_roles: allowed_roles.into(),
        }
    }

    pub fn decide(&self, state: &AuthState) -> GateOutcome {
        match &state.user {
            Some(user) if self.allowed_roles.contains(&user.role) => GateOutcome::Shown,
            _ => GateOutcome::Hidden,
        }
    }
}
