use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tillpoint_auth::AuthzError;
use tillpoint_core::{DomainError, FieldErrors};
use tillpoint_infra::StoreError;

/// Everything a handler can fail with, mapped onto one JSON error shape.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    PrivilegeEscalation(String),

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Not found.")]
    NotFound,

    #[error("Method not allowed.")]
    MethodNotAllowed,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated("Authentication credentials were not provided.".to_string())
    }

    pub fn invalid_token() -> Self {
        Self::Unauthenticated("Invalid token.".to_string())
    }

    pub fn field(field: &str, msg: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, msg))
    }

    pub fn non_field(msg: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::non_field(msg))
    }

    pub fn internal(err: impl core::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => Self::Validation(errors),
            DomainError::InvalidId(_) | DomainError::NotFound => Self::NotFound,
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => Self::unauthenticated(),
            AuthzError::Forbidden { .. } => {
                Self::Forbidden("You do not have permission to perform this action.".to_string())
            }
            AuthzError::PrivilegeEscalation { .. } => Self::PrivilegeEscalation(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { field } => {
                Self::field(field, format!("A record with this {field} already exists."))
            }
            StoreError::NotFound => Self::NotFound,
            StoreError::AlreadyExists | StoreError::Poisoned => Self::internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Unauthenticated(msg) => {
                json_error(StatusCode::UNAUTHORIZED, "not_authenticated", msg)
            }
            ApiError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "permission_denied", msg),
            ApiError::PrivilegeEscalation(msg) => {
                json_error(StatusCode::FORBIDDEN, "privilege_escalation", msg)
            }
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({
                    "error": "validation_error",
                    "message": fields.to_string(),
                    "fields": fields,
                })),
            )
                .into_response(),
            ApiError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "Not found."),
            ApiError::MethodNotAllowed => json_error(
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                "Method not allowed.",
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Fallback for methods a route does not serve (including every `DELETE`).
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
