use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::{Permission, PermissionRule, PermissionTable, Principal, PrincipalId, Role, StaffRole};

/// Stable classification of a refused request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    Unauthenticated,
    InsufficientRole,
    InsufficientPermission,
    WrongTenant,
    MissingOrganization,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::Unauthenticated => "UNAUTHENTICATED",
            DenyReason::InsufficientRole => "INSUFFICIENT_ROLE",
            DenyReason::InsufficientPermission => "INSUFFICIENT_PERMISSION",
            DenyReason::WrongTenant => "WRONG_TENANT",
            DenyReason::MissingOrganization => "MISSING_ORGANIZATION",
        }
    }
}

impl core::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal authorization failure for the current request.
///
/// Messages are safe to show to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("role {role} is not allowed to perform this operation")]
    InsufficientRole { role: Role },

    #[error("missing permission '{permission}'")]
    InsufficientPermission { permission: Permission },

    #[error("resource belongs to another organization")]
    WrongTenant,

    #[error("principal must belong to an organization")]
    MissingOrganization,
}

impl AuthzError {
    pub fn reason(&self) -> DenyReason {
        match self {
            AuthzError::Unauthenticated => DenyReason::Unauthenticated,
            AuthzError::InsufficientRole { .. } => DenyReason::InsufficientRole,
            AuthzError::InsufficientPermission { .. } => DenyReason::InsufficientPermission,
            AuthzError::WrongTenant => DenyReason::WrongTenant,
            AuthzError::MissingOrganization => DenyReason::MissingOrganization,
        }
    }
}

/// Role and permission gates.
///
/// Every decision is a pure function of the principal, the requirement and
/// the permission table; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    table: Arc<PermissionTable>,
}

impl AccessPolicy {
    pub fn new(table: Arc<PermissionTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PermissionTable {
        &self.table
    }

    /// Allow iff the principal's role is in `allowed`.
    ///
    /// Exact set membership: no hierarchy and no implicit super-admin. A gate
    /// open to super-admins lists `Role::SuperAdmin` explicitly.
    pub fn require_role(&self, principal: &Principal, allowed: &[Role]) -> Result<(), AuthzError> {
        if allowed.contains(&principal.role()) {
            return Ok(());
        }
        tracing::warn!(
            principal_id = %principal.id(),
            role = %principal.role(),
            ?allowed,
            "role_check_failed"
        );
        Err(AuthzError::InsufficientRole {
            role: principal.role(),
        })
    }

    /// Allow iff the permission table grants `permission` to the principal.
    ///
    /// Super-admins pass every permission check.
    pub fn require_permission(&self, principal: &Principal, permission: Permission) -> Result<(), AuthzError> {
        if principal.is_super_admin() {
            return Ok(());
        }

        let granted = self
            .table
            .rule(permission)
            .is_some_and(|rule| rule.admits(principal.role(), principal.role_tag()));
        if granted {
            return Ok(());
        }

        tracing::warn!(
            principal_id = %principal.id(),
            role = %principal.role(),
            role_tag = ?principal.role_tag(),
            %permission,
            "permission_check_failed"
        );
        Err(AuthzError::InsufficientPermission { permission })
    }

    /// Explain the decision [`Self::require_permission`] would make.
    pub fn explain(&self, principal: &Principal, permission: Permission) -> AuthorizationExplanation {
        let rule = self.table.rule(permission).cloned();
        let state = PrincipalState::of(principal);

        if principal.is_super_admin() {
            return AuthorizationExplanation {
                required_permission: permission,
                granted: true,
                reason: "super-admin passes every permission check".to_string(),
                denial: None,
                principal: state,
                rule,
            };
        }

        let Some(r) = rule.as_ref() else {
            return AuthorizationExplanation {
                required_permission: permission,
                granted: false,
                reason: format!("no rule configured for '{permission}'"),
                denial: Some(DenyReason::InsufficientPermission),
                principal: state,
                rule,
            };
        };

        let (granted, reason) = explain_rule(r, principal, permission);
        AuthorizationExplanation {
            required_permission: permission,
            granted,
            reason,
            denial: (!granted).then_some(DenyReason::InsufficientPermission),
            principal: state,
            rule,
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(Arc::new(PermissionTable::standard()))
    }
}

fn explain_rule(rule: &PermissionRule, principal: &Principal, permission: Permission) -> (bool, String) {
    let role = principal.role();
    if !rule.allowed_roles().contains(&role) {
        return (false, format!("role {role} is not granted '{permission}'"));
    }
    if role != Role::Staff {
        return (true, format!("role {role} is granted '{permission}'"));
    }
    match (rule.staff_tags(), principal.role_tag()) {
        (None, _) => (true, format!("all staff are granted '{permission}'")),
        (Some(tags), Some(tag)) if tags.contains(&tag) => {
            (true, format!("staff role '{tag}' is granted '{permission}'"))
        }
        (Some(_), Some(tag)) => (false, format!("staff role '{tag}' is not granted '{permission}'")),
        (Some(_), None) => (false, format!("'{permission}' requires a staff role-tag")),
    }
}

/// Auditable answer to "why was this allowed/denied?".
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub required_permission: Permission,
    pub granted: bool,
    pub reason: String,
    pub denial: Option<DenyReason>,
    pub principal: PrincipalState,
    pub rule: Option<PermissionRule>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrincipalState {
    pub principal_id: PrincipalId,
    pub role: Role,
    pub role_tag: Option<StaffRole>,
}

impl PrincipalState {
    fn of(principal: &Principal) -> Self {
        Self {
            principal_id: principal.id(),
            role: principal.role(),
            role_tag: principal.role_tag(),
        }
    }
}
