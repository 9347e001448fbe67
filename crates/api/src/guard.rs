//! Route-level role and permission gates.
//!
//! Gates are attached with `MethodRouter::route_layer`, so a refused request
//! never reaches the handler:
//!
//! ```ignore
//! get(list_products).route_layer(from_fn_with_state(
//!     gates.permission(Permission::ViewInventory),
//!     guard::permission_gate,
//! ))
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use shopdesk_auth::{AccessPolicy, AuthzError, Permission, Principal, Role};

use crate::app::errors::ApiError;

/// Factory for gate states sharing one [`AccessPolicy`].
#[derive(Debug, Clone)]
pub struct Gates {
    policy: Arc<AccessPolicy>,
}

impl Gates {
    pub fn new(policy: Arc<AccessPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &Arc<AccessPolicy> {
        &self.policy
    }

    pub fn permission(&self, permission: Permission) -> PermissionGate {
        PermissionGate {
            policy: self.policy.clone(),
            permission,
        }
    }

    pub fn roles(&self, allowed: &[Role]) -> RoleGate {
        RoleGate {
            policy: self.policy.clone(),
            allowed: Arc::from(allowed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PermissionGate {
    policy: Arc<AccessPolicy>,
    permission: Permission,
}

#[derive(Debug, Clone)]
pub struct RoleGate {
    policy: Arc<AccessPolicy>,
    allowed: Arc<[Role]>,
}

pub async fn permission_gate(State(gate): State<PermissionGate>, req: Request, next: Next) -> Response {
    let decision = match req.extensions().get::<Principal>() {
        Some(principal) => gate.policy.require_permission(principal, gate.permission),
        None => Err(AuthzError::Unauthenticated),
    };
    match decision {
        Ok(()) => next.run(req).await,
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn role_gate(State(gate): State<RoleGate>, req: Request, next: Next) -> Response {
    let decision = match req.extensions().get::<Principal>() {
        Some(principal) => gate.policy.require_role(principal, &gate.allowed),
        None => Err(AuthzError::Unauthenticated),
    };
    match decision {
        Ok(()) => next.run(req).await,
        Err(e) => ApiError::from(e).into_response(),
    }
}
