//! `shopdesk-auth`: principal resolution, role/permission gates, and tenant scoping.
//!
//! This crate is decoupled from HTTP and storage.

use thiserror::Error;

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod scope;

pub use authorize::{AccessPolicy, AuthorizationExplanation, AuthzError, DenyReason, PrincipalState};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator, TokenError};
pub use permissions::Permission;
pub use policy::{PermissionRule, PermissionTable, PermissionTableBuilder, PolicyError};
pub use principal::{Principal, PrincipalId};
pub use roles::{Role, StaffRole};
pub use scope::{
    OrganizationScope, ensure_owned_access, organization_scope, require_organization, target_organization,
    validate_organization_access,
};

/// A role, staff role or permission name that is not in the catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{name}'")]
pub struct UnknownName {
    kind: &'static str,
    name: String,
}

impl UnknownName {
    pub(crate) fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }
}
