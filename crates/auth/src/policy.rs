//! Permission → role rules.
//!
//! The table is an explicitly constructed, immutable value handed to
//! [`crate::AccessPolicy`] at startup. Tests can build alternate tables with
//! [`PermissionTable::builder`].

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::{Permission, Role, StaffRole};

/// Which principals hold one permission.
///
/// `roles` is plain set membership. When `Staff` is listed, `staff_tags`
/// optionally narrows it to specific job functions; a staff principal without
/// a role-tag then never matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionRule {
    roles: Vec<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    staff_tags: Option<Vec<StaffRole>>,
}

impl PermissionRule {
    pub fn roles(roles: &[Role]) -> Self {
        Self {
            roles: roles.to_vec(),
            staff_tags: None,
        }
    }

    /// Admit `Staff` principals whose role-tag is one of `tags`.
    pub fn with_staff_tags(mut self, tags: &[StaffRole]) -> Self {
        if !self.roles.contains(&Role::Staff) {
            self.roles.push(Role::Staff);
        }
        self.staff_tags = Some(tags.to_vec());
        self
    }

    pub fn allowed_roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn staff_tags(&self) -> Option<&[StaffRole]> {
        self.staff_tags.as_deref()
    }

    /// Whether a (role, role-tag) pair satisfies this rule.
    ///
    /// Super-admin bypass is not encoded here; it belongs to the access policy.
    pub fn admits(&self, role: Role, role_tag: Option<StaffRole>) -> bool {
        if !self.roles.contains(&role) {
            return false;
        }
        match (role, &self.staff_tags) {
            (Role::Staff, Some(tags)) => role_tag.is_some_and(|t| tags.contains(&t)),
            _ => true,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("no rule configured for permission '{0}'")]
    MissingRule(Permission),

    #[error("permission '{0}' has more than one rule")]
    DuplicateRule(Permission),
}

/// Immutable permission table. Every permission maps to exactly one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTable {
    rules: HashMap<Permission, PermissionRule>,
}

impl PermissionTable {
    /// The table shipped with the service.
    pub fn standard() -> Self {
        let rules = Permission::ALL
            .into_iter()
            .map(|p| (p, standard_rule(p)))
            .collect();
        Self { rules }
    }

    pub fn builder() -> PermissionTableBuilder {
        PermissionTableBuilder::default()
    }

    pub fn rule(&self, permission: Permission) -> Option<&PermissionRule> {
        self.rules.get(&permission)
    }

    /// Rules in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (Permission, &PermissionRule)> + '_ {
        Permission::ALL
            .into_iter()
            .filter_map(|p| self.rules.get(&p).map(|r| (p, r)))
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_rule(permission: Permission) -> PermissionRule {
    use Role::TenantAdmin;
    use StaffRole::*;

    let admin = PermissionRule::roles(&[TenantAdmin]);
    match permission {
        Permission::ViewAccounting | Permission::ManageAccounting => admin.with_staff_tags(&[Accountant]),
        Permission::ViewInventory => {
            admin.with_staff_tags(&[InventoryManager, SalesExecutive, Cashier, ShippingCoordinator])
        }
        Permission::ManageInventory => admin.with_staff_tags(&[InventoryManager]),
        Permission::ViewOrders => admin.with_staff_tags(&[
            SalesExecutive,
            Cashier,
            ShippingCoordinator,
            SupportAgent,
            Accountant,
        ]),
        Permission::ManageOrders => admin.with_staff_tags(&[SalesExecutive, Cashier]),
        Permission::ProcessPos => admin.with_staff_tags(&[Cashier, SalesExecutive]),
        Permission::ManageShipping => admin.with_staff_tags(&[ShippingCoordinator]),
        Permission::ViewAnalytics => admin.with_staff_tags(&[Accountant, SalesExecutive]),
        Permission::ManageUsers | Permission::ManageSettings => admin,
    }
}

#[derive(Debug, Default)]
pub struct PermissionTableBuilder {
    rules: HashMap<Permission, PermissionRule>,
    duplicate: Option<Permission>,
}

impl PermissionTableBuilder {
    pub fn rule(mut self, permission: Permission, rule: PermissionRule) -> Self {
        if self.rules.insert(permission, rule).is_some() && self.duplicate.is_none() {
            self.duplicate = Some(permission);
        }
        self
    }

    pub fn build(self) -> Result<PermissionTable, PolicyError> {
        if let Some(p) = self.duplicate {
            return Err(PolicyError::DuplicateRule(p));
        }
        if let Some(missing) = Permission::ALL.into_iter().find(|p| !self.rules.contains_key(p)) {
            return Err(PolicyError::MissingRule(missing));
        }
        Ok(PermissionTable { rules: self.rules })
    }
}
