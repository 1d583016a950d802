//! Login, logout and self-service account endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;

use tillpoint_auth::User;
use tillpoint_core::FieldErrors;
use tillpoint_infra::RecordStore;

use crate::app::dto::{parse_body, ChangePasswordRequest, LoginRequest, ProfileRequest, ProfileResponse};
use crate::app::errors::{method_not_allowed, ApiError};
use crate::app::services::{AppServices, IssuedToken};
use crate::authz;
use crate::context::Identity;

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login).fallback(method_not_allowed))
        .route("/logout", delete(logout).fallback(method_not_allowed))
        .route(
            "/profile",
            get(profile).patch(update_profile).fallback(method_not_allowed),
        )
        .route(
            "/change-password",
            put(change_password)
                .patch(change_password)
                .fallback(method_not_allowed),
        )
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Result<Json<IssuedToken>, ApiError> {
    let req: LoginRequest = parse_body(&body)?;

    let mut errors = FieldErrors::new();
    errors.require("email", &req.email);
    errors.require("password", &req.password);
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(errors.into());
    };

    Ok(Json(services.login(&email, &password, Utc::now())?))
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
) -> Result<StatusCode, ApiError> {
    let principal = authz::require_identity(&identity)?;
    services.logout(principal.session_id, Utc::now());
    Ok(StatusCode::NO_CONTENT)
}

pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
) -> Result<Json<serde_json::Value>, ApiError> {
    let principal = authz::require_identity(&identity)?;
    let user = services
        .users
        .get(&principal.user_id)
        .ok_or_else(ApiError::unauthenticated)?;
    Ok(Json(profile_json(&user)))
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let principal = authz::require_identity(&identity)?;
    let req: ProfileRequest = parse_body(&body)?;

    let user = services.users.update(&principal.user_id, |u: &mut User| {
        u.update_profile(req.email.as_deref(), req.name.as_deref(), Utc::now())
            .map_err(ApiError::from)
    })?;

    tracing::info!(user_id = %user.id, "profile updated");
    Ok(Json(profile_json(&user)))
}

/// `confirm_password`, when sent, must equal `password`.
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let principal = authz::require_identity(&identity)?;
    let req: ChangePasswordRequest = parse_body(&body)?;

    let mut errors = FieldErrors::new();
    errors.require("old_password", &req.old_password);
    errors.require("password", &req.password);
    let (Some(old_password), Some(password)) = (req.old_password, req.password) else {
        return Err(errors.into());
    };
    if req.confirm_password.is_some_and(|confirm| confirm != password) {
        return Err(ApiError::field("password", "Password fields didn't match."));
    }

    services.change_password(principal.user_id, &old_password, &password, Utc::now())?;
    Ok(StatusCode::NO_CONTENT)
}

fn profile_json(user: &User) -> serde_json::Value {
    serde_json::to_value(ProfileResponse {
        email: &user.email,
        name: &user.name,
    })
    .unwrap_or(serde_json::Value::Null)
}
