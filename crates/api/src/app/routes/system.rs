use std::sync::Arc;

use axum::extract::Extension;
use serde_json::{Value, json};

use shopdesk_auth::{AccessPolicy, Permission, Principal};

use crate::app::dto::WhoAmI;
use crate::app::errors::ApiError;
use crate::envelope::ApiResponse;

pub async fn health() -> ApiResponse<Value> {
    ApiResponse::ok(json!({ "status": "ok" }))
}

pub async fn whoami(
    Extension(policy): Extension<Arc<AccessPolicy>>,
    Extension(principal): Extension<Principal>,
) -> ApiResponse<WhoAmI> {
    let permissions = Permission::ALL
        .into_iter()
        .filter(|p| policy.explain(&principal, *p).granted)
        .collect();

    ApiResponse::ok(WhoAmI {
        principal_id: principal.id(),
        role: principal.role(),
        role_tag: principal.role_tag(),
        organization_id: principal.organization_id(),
        permissions,
    })
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("route")
}
