//! Tenant scoping.
//!
//! The super-admin bypass is expressed here once. Route handlers never
//! compare organization ids themselves.

use serde::Serialize;

use shopdesk_core::{OrganizationId, OrganizationOwned};

use crate::{AuthzError, Principal};

/// Organizations a principal's queries are restricted to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "organization_id", rename_all = "snake_case")]
pub enum OrganizationScope {
    /// No filter: every tenant (super-admins only).
    All,
    Organization(OrganizationId),
}

impl OrganizationScope {
    /// Filter handed to persistence: `None` means "no filter".
    pub fn organization_id(&self) -> Option<OrganizationId> {
        match self {
            OrganizationScope::All => None,
            OrganizationScope::Organization(id) => Some(*id),
        }
    }

    pub fn contains(&self, organization_id: OrganizationId) -> bool {
        match self {
            OrganizationScope::All => true,
            OrganizationScope::Organization(id) => *id == organization_id,
        }
    }
}

/// Scope for list/query operations.
///
/// A non-super-admin without an organization fails with
/// `MissingOrganization`; it never degrades to an empty result.
pub fn organization_scope(principal: &Principal) -> Result<OrganizationScope, AuthzError> {
    if principal.is_super_admin() {
        return Ok(OrganizationScope::All);
    }
    principal
        .organization_id()
        .map(OrganizationScope::Organization)
        .ok_or(AuthzError::MissingOrganization)
}

/// The principal's own organization, for operations that need one.
pub fn require_organization(principal: &Principal) -> Result<OrganizationId, AuthzError> {
    principal.organization_id().ok_or(AuthzError::MissingOrganization)
}

/// Organization a new record is created under.
///
/// Tenant principals always create in their own organization; a `requested`
/// organization that differs is refused. Super-admins may name any
/// organization, and must name one when they have none of their own.
pub fn target_organization(
    principal: &Principal,
    requested: Option<OrganizationId>,
) -> Result<OrganizationId, AuthzError> {
    if principal.is_super_admin() {
        return requested
            .or(principal.organization_id())
            .ok_or(AuthzError::MissingOrganization);
    }
    let own = require_organization(principal)?;
    match requested {
        Some(r) if r != own => Err(AuthzError::WrongTenant),
        _ => Ok(own),
    }
}

/// Allow iff the principal is a super-admin or belongs to `resource_organization_id`.
pub fn validate_organization_access(
    principal: &Principal,
    resource_organization_id: OrganizationId,
) -> Result<(), AuthzError> {
    if principal.is_super_admin() {
        return Ok(());
    }
    let own = require_organization(principal)?;
    if own == resource_organization_id {
        return Ok(());
    }
    tracing::warn!(
        principal_id = %principal.id(),
        organization_id = %own,
        resource_organization_id = %resource_organization_id,
        "cross_tenant_access_denied"
    );
    Err(AuthzError::WrongTenant)
}

pub fn ensure_owned_access<R: OrganizationOwned + ?Sized>(principal: &Principal, resource: &R) -> Result<(), AuthzError> {
    validate_organization_access(principal, resource.organization_id())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{DenyReason, PrincipalId, Role, StaffRole};

    fn tenant_roles() -> impl Strategy<Value = Role> {
        prop::sample::select(vec![Role::TenantAdmin, Role::Staff, Role::Customer])
    }

    #[test]
    fn super_admin_scope_is_unfiltered() {
        let p = Principal::super_admin(PrincipalId::new());
        let scope = organization_scope(&p).unwrap();
        assert_eq!(scope, OrganizationScope::All);
        assert_eq!(scope.organization_id(), None);
    }

    #[test]
    fn super_admin_with_home_org_still_sees_everything() {
        let home = OrganizationId::new();
        let p = Principal::new(PrincipalId::new(), Role::SuperAdmin, None, Some(home));
        assert_eq!(organization_scope(&p).unwrap(), OrganizationScope::All);
        assert!(validate_organization_access(&p, OrganizationId::new()).is_ok());
    }

    #[test]
    fn tenant_admin_cannot_reach_other_org() {
        let org1 = OrganizationId::new();
        let org2 = OrganizationId::new();
        let p = Principal::tenant_admin(PrincipalId::new(), org1);
        assert_eq!(validate_organization_access(&p, org1), Ok(()));
        let err = validate_organization_access(&p, org2).unwrap_err();
        assert_eq!(err.reason(), DenyReason::WrongTenant);
    }

    #[test]
    fn orgless_staff_fails_with_missing_organization() {
        let p = Principal::new(PrincipalId::new(), Role::Staff, Some(StaffRole::Accountant), None);
        assert_eq!(organization_scope(&p), Err(AuthzError::MissingOrganization));
        assert_eq!(
            validate_organization_access(&p, OrganizationId::new()),
            Err(AuthzError::MissingOrganization)
        );
    }

    #[test]
    fn target_organization_rules() {
        let own = OrganizationId::new();
        let other = OrganizationId::new();
        let admin = Principal::tenant_admin(PrincipalId::new(), own);
        assert_eq!(target_organization(&admin, None), Ok(own));
        assert_eq!(target_organization(&admin, Some(own)), Ok(own));
        assert_eq!(target_organization(&admin, Some(other)), Err(AuthzError::WrongTenant));

        let root = Principal::super_admin(PrincipalId::new());
        assert_eq!(target_organization(&root, Some(other)), Ok(other));
        assert_eq!(target_organization(&root, None), Err(AuthzError::MissingOrganization));
    }

    proptest! {
        #[test]
        fn super_admin_always_allowed(has_home in any::<bool>(), bits in any::<u128>()) {
            let home = has_home.then(OrganizationId::new);
            let p = Principal::new(PrincipalId::new(), Role::SuperAdmin, None, home);
            let target = OrganizationId::from_uuid(uuid::Uuid::from_u128(bits));
            prop_assert!(validate_organization_access(&p, target).is_ok());
            prop_assert_eq!(organization_scope(&p).unwrap().organization_id(), None);
        }

        #[test]
        fn tenant_principal_allowed_only_in_own_org(role in tenant_roles(), same in any::<bool>()) {
            let own = OrganizationId::new();
            let p = Principal::new(PrincipalId::new(), role, None, Some(own));
            let target = if same { own } else { OrganizationId::new() };
            let res = validate_organization_access(&p, target);
            if same {
                prop_assert!(res.is_ok());
            } else {
                prop_assert_eq!(res, Err(AuthzError::WrongTenant));
            }
            prop_assert_eq!(organization_scope(&p).unwrap(), OrganizationScope::Organization(own));
        }

        #[test]
        fn orgless_tenant_principal_always_missing_org(role in tenant_roles(), bits in any::<u128>()) {
            let p = Principal::new(PrincipalId::new(), role, None, None);
            let target = OrganizationId::from_uuid(uuid::Uuid::from_u128(bits));
            prop_assert_eq!(validate_organization_access(&p, target), Err(AuthzError::MissingOrganization));
            prop_assert_eq!(organization_scope(&p), Err(AuthzError::MissingOrganization));
        }
    }
}
