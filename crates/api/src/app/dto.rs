use serde::{Deserialize, Serialize};

use shopdesk_auth::{Permission, PermissionRule, Principal, PrincipalId, Role, StaffRole};
use shopdesk_commerce::Order;
use shopdesk_core::{OrganizationId, ResourceId};
use shopdesk_infra::PageRequest;

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

/// Create body: the record's fields plus an optional target organization.
///
/// Only super-admins may name an organization other than their own.
#[derive(Debug, Deserialize)]
pub struct CreateRequest<T> {
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
    #[serde(flatten)]
    pub record: T,
}

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub permission: String,
    pub role: Option<String>,
    pub role_tag: Option<String>,
}

impl ExplainQuery {
    pub fn permission(&self) -> Result<Permission, ApiError> {
        self.permission
            .parse()
            .map_err(|e: shopdesk_auth::UnknownName| ApiError::validation(e.to_string()))
    }

    /// The principal to evaluate: the caller, or a hypothetical principal in
    /// the caller's organization when `role` is given.
    pub fn subject(&self, caller: &Principal) -> Result<Principal, ApiError> {
        let Some(role) = &self.role else {
            return Ok(caller.clone());
        };
        let role: Role = role
            .parse()
            .map_err(|e: shopdesk_auth::UnknownName| ApiError::validation(e.to_string()))?;
        let tag = self
            .role_tag
            .as_deref()
            .map(str::parse::<StaffRole>)
            .transpose()
            .map_err(|e| ApiError::validation(e.to_string()))?;
        Ok(Principal::new(caller.id(), role, tag, caller.organization_id()))
    }
}

pub fn parse_resource_id(raw: &str) -> Result<ResourceId, ApiError> {
    raw.parse().map_err(|_| ApiError::validation(format!("invalid id '{raw}'")))
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub principal_id: PrincipalId,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_tag: Option<StaffRole>,
    pub organization_id: Option<OrganizationId>,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub total_cents: u64,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            total_cents: order.total_cents(),
            order,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PermissionEntry {
    pub permission: Permission,
    pub category: &'static str,
    pub rule: PermissionRule,
}
