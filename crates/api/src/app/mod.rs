//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores and credential services shared by handlers
//! - `resource.rs`: generic list/create/retrieve/update handlers
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod resource;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        jwt: services.jwt_validator(),
        services: services.clone(),
    };

    // Identity is resolved for every route below; the gate decides access.
    let api = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::identity_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
        .fallback(routes::system::not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
