use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use tillpoint_auth::JwtValidator;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub services: Arc<AppServices>,
}

/// Resolve the bearer credential, if any, into a request-scoped `Principal`.
///
/// No `Authorization` header means an anonymous request; the gate decides what
/// it may do. A header that is present but unusable is rejected here with 401.
pub async fn identity_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(Some(token)) => token,
        Ok(None) => return next.run(req).await,
        Err(e) => return e.into_response(),
    };

    let now = Utc::now();
    let claims = match state.jwt.validate(&token, now) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "bearer token rejected");
            return ApiError::invalid_token().into_response();
        }
    };

    match state.services.principal_for(&claims, now) {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(user_id = %claims.sub, session_id = %claims.sid, "session not usable");
            e.into_response()
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| ApiError::invalid_token())?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(ApiError::invalid_token)?
        .trim();
    if token.is_empty() {
        return Err(ApiError::invalid_token());
    }

    Ok(Some(token.to_string()))
}
