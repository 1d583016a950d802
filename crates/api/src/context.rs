use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use tillpoint_auth::Principal;

/// Identity resolved for a request, if any.
///
/// Populated by [`crate::middleware::identity_middleware`]. Handlers never
/// reject on extraction; an absent principal is for the gate to judge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity(Option<Principal>);

impl Identity {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Principal>().cloned()))
    }
}
