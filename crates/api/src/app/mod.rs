//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store wiring (in-memory or Postgres)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: error to status/code mapping

use std::sync::Arc;

use axum::{Extension, Router, middleware::from_fn, middleware::from_fn_with_state, routing::get};

use shopdesk_auth::{AccessPolicy, Hs256JwtValidator, JwtValidator};
use shopdesk_infra::StoreError;

use crate::config::ApiConfig;
use crate::guard::Gates;
use crate::middleware::{self, AuthState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Assemble the router from already-built parts.
///
/// Layer order, outermost first: correlation, authentication, then the
/// per-route role/permission gate, then the handler.
pub fn router(
    services: Arc<AppServices>,
    policy: Arc<AccessPolicy>,
    jwt: Arc<dyn JwtValidator>,
    session_cookie: &str,
) -> Router {
    let auth_state = AuthState {
        jwt,
        session_cookie: Arc::from(session_cookie),
    };
    let gates = Gates::new(policy.clone());

    let protected = routes::router(&gates)
        .layer(Extension(services))
        .layer(Extension(policy))
        .layer(from_fn_with_state(auth_state, middleware::auth_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .fallback(routes::system::not_found)
        .layer(from_fn(middleware::correlation_middleware))
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> Result<Router, StoreError> {
    let jwt = Arc::new(Hs256JwtValidator::new(config.jwt_secret.clone().into_bytes()));
    let services = Arc::new(services::build_services(config.database_url.as_deref()).await?);
    let policy = Arc::new(AccessPolicy::default());

    Ok(router(services, policy, jwt, &config.session_cookie))
}
