use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Query, rejection::QueryRejection},
    middleware::from_fn_with_state,
    routing::get,
};

use shopdesk_auth::{AccessPolicy, AuthorizationExplanation, Principal, Role};

use crate::app::dto::{ExplainQuery, PermissionEntry};
use crate::app::errors::ApiResult;
use crate::envelope::ApiResponse;
use crate::guard::{self, Gates};

const ADMIN_ROLES: &[Role] = &[Role::SuperAdmin, Role::TenantAdmin];

pub fn router(gates: &Gates) -> Router {
    let admins = || from_fn_with_state(gates.roles(ADMIN_ROLES), guard::role_gate);

    Router::new()
        .route("/rbac/permissions", get(list_permissions).route_layer(admins()))
        .route("/rbac/explain", get(explain).route_layer(admins()))
}

/// The permission table in catalog order.
pub async fn list_permissions(
    Extension(policy): Extension<Arc<AccessPolicy>>,
) -> ApiResponse<Vec<PermissionEntry>> {
    let entries = policy
        .table()
        .iter()
        .map(|(permission, rule)| PermissionEntry {
            permission,
            category: permission.category(),
            rule: rule.clone(),
        })
        .collect();
    ApiResponse::ok(entries)
}

/// Explain a permission decision for the caller or a hypothetical role.
pub async fn explain(
    Extension(policy): Extension<Arc<AccessPolicy>>,
    Extension(principal): Extension<Principal>,
    query: Result<Query<ExplainQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<AuthorizationExplanation>> {
    let Query(query) = query?;
    let permission = query.permission()?;
    let subject = query.subject(&principal)?;
    Ok(ApiResponse::ok(policy.explain(&subject, permission)))
}
