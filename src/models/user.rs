//! Identity types.
//!
//! The Identity Provider is an external collaborator: callers arrive with an
//! already-verified `(user_id, role)` pair and the engine performs no
//! credential checks of its own.

use serde::{Deserialize, Serialize};

/// Role attached to a verified caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// Verified caller identity, as produced by the Identity Provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Whether this caller may act on a reservation owned by `owner_id`
    pub fn can_access_reservation_of(&self, owner_id: &str) -> bool {
        self.user_id == owner_id || self.role.is_admin()
    }
}

/// User profile fields resolved for display in booking responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetail {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}
