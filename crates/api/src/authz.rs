//! API-side authorization guard.
//!
//! Every handler calls [`gate`] before it looks at the request body, so a
//! denied caller never learns anything from validation output.

use tillpoint_auth::{authorize, Action, AuthzError, Decision, Principal, ResourceKind};

use crate::app::errors::ApiError;
use crate::context::Identity;

/// Run the authorization gate for `action` on `resource`.
///
/// Returns the acting principal on success.
pub fn gate(
    identity: &Identity,
    resource: ResourceKind,
    action: Action,
) -> Result<&Principal, ApiError> {
    match authorize(identity.principal(), resource, action) {
        Decision::Allow => identity.principal().ok_or_else(ApiError::unauthenticated),
        Decision::Deny(denial) => {
            tracing::debug!(
                %resource,
                %action,
                user_id = ?identity.principal().map(|p| p.user_id),
                ?denial,
                "request denied"
            );
            Err(AuthzError::from(denial).into())
        }
    }
}

/// Endpoints open to any authenticated identity (profile, logout, audit).
pub fn require_identity(identity: &Identity) -> Result<&Principal, ApiError> {
    identity.principal().ok_or_else(ApiError::unauthenticated)
}
