use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownName;

/// Role of an authenticated principal.
///
/// This is a closed set: there are no custom roles and no hierarchy between
/// them. Gates that accept several roles must list each of them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    TenantAdmin,
    Staff,
    Customer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::TenantAdmin, Role::Staff, Role::Customer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::TenantAdmin => "TENANT_ADMIN",
            Role::Staff => "STAFF",
            Role::Customer => "CUSTOMER",
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownName::new("role", s))
    }
}

/// Job function refining the generic `Staff` role.
///
/// Only meaningful when the principal's role is [`Role::Staff`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Accountant,
    InventoryManager,
    SalesExecutive,
    Cashier,
    ShippingCoordinator,
    SupportAgent,
}

impl StaffRole {
    pub const ALL: [StaffRole; 6] = [
        StaffRole::Accountant,
        StaffRole::InventoryManager,
        StaffRole::SalesExecutive,
        StaffRole::Cashier,
        StaffRole::ShippingCoordinator,
        StaffRole::SupportAgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Accountant => "accountant",
            StaffRole::InventoryManager => "inventory_manager",
            StaffRole::SalesExecutive => "sales_executive",
            StaffRole::Cashier => "cashier",
            StaffRole::ShippingCoordinator => "shipping_coordinator",
            StaffRole::SupportAgent => "support_agent",
        }
    }
}

impl core::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffRole {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StaffRole::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownName::new("staff role", s))
    }
}
