//! RBAC audit endpoints for transparent authorization debugging.
//!
//! These endpoints expose the effective policy and explain individual
//! decisions, to answer "why was this request denied?".

use axum::{
    extract::Query,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use tillpoint_auth::{explain_authorization, policy_matrix, Action, ResourceKind, Role};
use tillpoint_core::FieldErrors;

use crate::app::errors::{method_not_allowed, ApiError};
use crate::authz;
use crate::context::Identity;

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub resource: Option<String>,
    pub action: Option<String>,
}

pub fn router() -> Router {
    Router::new()
        .route("/policy", get(policy).fallback(method_not_allowed))
        .route("/explain", get(explain).fallback(method_not_allowed))
}

/// GET /rbac/policy - every (resource, action) pair with its requirement,
/// plus the role ladder.
pub async fn policy(identity: Identity) -> Result<Json<serde_json::Value>, ApiError> {
    authz::require_identity(&identity)?;

    let roles: Vec<_> = Role::ALL
        .into_iter()
        .map(|role| {
            serde_json::json!({
                "role": role,
                "description": role.description(),
                "flags": role.flags(),
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "roles": roles,
        "policy": policy_matrix(),
    })))
}

/// GET /rbac/explain?resource=X&action=Y - explain the caller's own decision.
pub async fn explain(
    identity: Identity,
    Query(query): Query<ExplainQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let principal = authz::require_identity(&identity)?;

    let mut errors = FieldErrors::new();
    let resource = parse_param::<ResourceKind>(&mut errors, "resource", query.resource.as_deref());
    let action = parse_param::<Action>(&mut errors, "action", query.action.as_deref());
    let (Some(resource), Some(action)) = (resource, action) else {
        return Err(errors.into());
    };

    let explanation = explain_authorization(Some(principal), resource, action);
    Ok(Json(serde_json::json!({ "explanation": explanation })))
}

fn parse_param<T: core::str::FromStr<Err = String>>(
    errors: &mut FieldErrors,
    field: &str,
    raw: Option<&str>,
) -> Option<T> {
    let Some(raw) = raw else {
        errors.add(field, tillpoint_core::validation::REQUIRED);
        return None;
    };
    match raw.parse() {
        Ok(value) => Some(value),
        Err(msg) => {
            errors.add(field, msg);
            None
        }
    }
}
