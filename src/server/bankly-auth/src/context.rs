//! Request-scoped identity context.

use crate::token::Claims;

/// Identity fields attached to an in-flight request.
///
/// Created by identity propagation from a decoded token, consumed by the
/// access control gates and route handlers, dropped at end of request.
/// Never persisted.
#[derive(Debug, Clone, Default)]
pub struct IdentityContext {
    /// Username of the current caller, if a token was presented.
    pub curr_username: Option<String>,
    /// Admin flag of the current caller, if a token was presented.
    pub curr_admin: Option<bool>,
}

impl IdentityContext {
    /// Context for a request without a token: no identity fields attached.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Builds a context from a decoded claims payload.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            curr_username: Some(claims.username.clone()),
            curr_admin: Some(claims.admin),
        }
    }

    /// True when a non-empty username is attached.
    pub fn is_authenticated(&self) -> bool {
        self.curr_username.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// True when the caller is an admin.
    pub fn is_admin(&self) -> bool {
        self.curr_admin.unwrap_or(false)
    }

    /// The current caller's username, if attached.
    pub fn username(&self) -> Option<&str> {
        self.curr_username.as_deref()
    }
}
