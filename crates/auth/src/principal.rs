use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shopdesk_core::OrganizationId;

use crate::{Role, SessionClaims, StaffRole};

/// Identity of an authenticated principal (human user, service account, etc).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for PrincipalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// The authenticated caller of one request.
///
/// Built fresh for every request from verified session claims and never
/// persisted. Fields are private so the role-tag invariant holds: only a
/// `Staff` principal carries a [`StaffRole`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    id: PrincipalId,
    role: Role,
    role_tag: Option<StaffRole>,
    organization_id: Option<OrganizationId>,
}

impl Principal {
    pub fn new(
        id: PrincipalId,
        role: Role,
        role_tag: Option<StaffRole>,
        organization_id: Option<OrganizationId>,
    ) -> Self {
        let role_tag = match role {
            Role::Staff => role_tag,
            _ => None,
        };
        Self {
            id,
            role,
            role_tag,
            organization_id,
        }
    }

    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self::new(claims.sub, claims.role, claims.role_tag, claims.organization_id)
    }

    pub fn super_admin(id: PrincipalId) -> Self {
        Self::new(id, Role::SuperAdmin, None, None)
    }

    pub fn tenant_admin(id: PrincipalId, organization_id: OrganizationId) -> Self {
        Self::new(id, Role::TenantAdmin, None, Some(organization_id))
    }

    pub fn staff(id: PrincipalId, organization_id: OrganizationId, tag: Option<StaffRole>) -> Self {
        Self::new(id, Role::Staff, tag, Some(organization_id))
    }

    pub fn customer(id: PrincipalId, organization_id: OrganizationId) -> Self {
        Self::new(id, Role::Customer, None, Some(organization_id))
    }

    pub fn id(&self) -> PrincipalId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn role_tag(&self) -> Option<StaffRole> {
        self.role_tag
    }

    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization_id
    }

    pub fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }
}
