//! User management.
//!
//! The gate admits managers and above; on top of that an actor only ever sees
//! accounts ranked strictly below their own, and may only hand out such roles.
//! Accounts outside that window answer 404 exactly like missing ones.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use tillpoint_auth::password::check_password;
use tillpoint_auth::{ensure_can_assign, Action, Principal, ResourceKind, Role, User};
use tillpoint_core::validation::BLANK;
use tillpoint_core::{FieldErrors, UserId};
use tillpoint_infra::{list_records, newest_first, RecordStore};

use crate::app::dto::{self, parse_body, UserRequest};
use crate::app::errors::{method_not_allowed, ApiError};
use crate::app::resource::{active_filter, QueryParams};
use crate::app::services::AppServices;
use crate::authz;
use crate::context::Identity;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_users).post(create_user).fallback(method_not_allowed),
        )
        .route(
            "/:id",
            get(get_user)
                .put(replace_user)
                .patch(update_user)
                .fallback(method_not_allowed),
        )
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let actor = authz::gate(&identity, ResourceKind::User, Action::List)?;
    let active = active_filter(&params)?;

    let users = list_records(
        &services.users,
        |u: &User| u.is_visible_to(actor) && active(u.is_active),
        newest_first,
    )?;
    Ok(Json(users.iter().map(dto::user_to_json).collect()))
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let actor = authz::gate(&identity, ResourceKind::User, Action::Create)?;
    let req: UserRequest = parse_body(&body)?;

    let mut errors = FieldErrors::new();
    errors.require("email", &req.email);
    errors.require("name", &req.name);
    errors.require("password", &req.password);
    let role = req.role(&mut errors).unwrap_or(Role::Member);

    let (Some(email), Some(name), Some(password)) = (&req.email, &req.name, &req.password) else {
        return Err(errors.into());
    };
    errors.into_result()?;

    ensure_can_assign(actor, role)?;
    let user = services.provision_account(
        email,
        name,
        password,
        role,
        req.is_active.unwrap_or(true),
    )?;

    tracing::info!(user_id = %user.id, actor = %actor.user_id, "user created");
    Ok((StatusCode::CREATED, Json(dto::user_to_json(&user))))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = authz::gate(&identity, ResourceKind::User, Action::Retrieve)?;
    let user = visible_user(&services, actor, &id)?;
    Ok(Json(dto::user_to_json(&user)))
}

/// PUT: `email` and `name` are required; password, role and active flag
/// change only when supplied.
pub async fn replace_user(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = authz::gate(&identity, ResourceKind::User, Action::Update)?;
    let target = visible_user(&services, actor, &id)?;
    let req: UserRequest = parse_body(&body)?;

    let mut errors = FieldErrors::new();
    errors.require("email", &req.email);
    errors.require("name", &req.name);
    errors.into_result()?;

    apply_user_changes(&services, actor, target.id, req)
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    identity: Identity,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let actor = authz::gate(&identity, ResourceKind::User, Action::PartialUpdate)?;
    let target = visible_user(&services, actor, &id)?;
    let req: UserRequest = parse_body(&body)?;

    apply_user_changes(&services, actor, target.id, req)
}

fn visible_user(services: &AppServices, actor: &Principal, raw_id: &str) -> Result<User, ApiError> {
    let id: UserId = raw_id.parse().map_err(|_| ApiError::NotFound)?;
    services
        .users
        .get(&id)
        .filter(|u| u.is_visible_to(actor))
        .ok_or(ApiError::NotFound)
}

fn apply_user_changes(
    services: &AppServices,
    actor: &Principal,
    id: UserId,
    req: UserRequest,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut errors = FieldErrors::new();
    let role = req.role(&mut errors);
    if let Some(password) = &req.password {
        if password.is_empty() {
            errors.add("password", BLANK);
        } else {
            check_password(&mut errors, "password", password);
        }
    }
    errors.into_result()?;

    if let Some(role) = role {
        ensure_can_assign(actor, role)?;
    }

    let password_hash = match &req.password {
        Some(password) => Some(services.hash_password(password)?),
        None => None,
    };

    let now = Utc::now();
    let user = services.users.update(&id, |u: &mut User| {
        if !u.is_visible_to(actor) {
            return Err(ApiError::NotFound);
        }
        u.update_profile(req.email.as_deref(), req.name.as_deref(), now)?;
        if let Some(role) = role {
            u.set_role(role, now);
        }
        if let Some(hash) = password_hash {
            u.set_password_hash(hash, now);
        }
        if let Some(is_active) = req.is_active {
            u.set_active(is_active, now);
        }
        Ok(())
    })?;

    tracing::info!(user_id = %user.id, actor = %actor.user_id, "user updated");
    Ok(Json(dto::user_to_json(&user)))
}
