use serde::Serialize;

use tillpoint_core::{SessionId, UserId};

use crate::Role;

/// A fully resolved identity for authorization decisions.
///
/// Built per request from a verified token plus the *current* user record, so
/// role changes apply on the next request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    /// Session backing the presented token (revoked on logout).
    pub session_id: SessionId,
}

impl Principal {
    pub fn has_at_least(&self, role: Role) -> bool {
        self.role.has_at_least(role)
    }
}
