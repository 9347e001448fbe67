use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownName;

/// Named capability gating an operation, independent of raw role.
///
/// The catalog is fixed at compile time; which roles hold a permission is
/// decided by a [`crate::PermissionTable`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    ViewAccounting,
    ManageAccounting,
    ViewInventory,
    ManageInventory,
    ViewOrders,
    ManageOrders,
    ProcessPos,
    ManageShipping,
    ViewAnalytics,
    ManageUsers,
    ManageSettings,
}

impl Permission {
    pub const ALL: [Permission; 11] = [
        Permission::ViewAccounting,
        Permission::ManageAccounting,
        Permission::ViewInventory,
        Permission::ManageInventory,
        Permission::ViewOrders,
        Permission::ManageOrders,
        Permission::ProcessPos,
        Permission::ManageShipping,
        Permission::ViewAnalytics,
        Permission::ManageUsers,
        Permission::ManageSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewAccounting => "VIEW_ACCOUNTING",
            Permission::ManageAccounting => "MANAGE_ACCOUNTING",
            Permission::ViewInventory => "VIEW_INVENTORY",
            Permission::ManageInventory => "MANAGE_INVENTORY",
            Permission::ViewOrders => "VIEW_ORDERS",
            Permission::ManageOrders => "MANAGE_ORDERS",
            Permission::ProcessPos => "PROCESS_POS",
            Permission::ManageShipping => "MANAGE_SHIPPING",
            Permission::ViewAnalytics => "VIEW_ANALYTICS",
            Permission::ManageUsers => "MANAGE_USERS",
            Permission::ManageSettings => "MANAGE_SETTINGS",
        }
    }

    /// Functional area, used to group permissions in audit listings.
    pub fn category(&self) -> &'static str {
        match self {
            Permission::ViewAccounting | Permission::ManageAccounting => "accounting",
            Permission::ViewInventory | Permission::ManageInventory => "inventory",
            Permission::ViewOrders | Permission::ManageOrders => "orders",
            Permission::ProcessPos => "pos",
            Permission::ManageShipping => "shipping",
            Permission::ViewAnalytics => "analytics",
            Permission::ManageUsers | Permission::ManageSettings => "admin",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownName::new("permission", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_parse_back() {
        let mut seen = std::collections::HashSet::new();
        for p in Permission::ALL {
            assert!(seen.insert(p.as_str()), "duplicate name {}", p);
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
        }
    }

    #[test]
    fn unknown_permission_does_not_parse() {
        let err = "VIEW_EVERYTHING".parse::<Permission>().unwrap_err();
        assert_eq!(err.to_string(), "unknown permission 'VIEW_EVERYTHING'");
    }
}
