//! Ownership of records by an organization (the tenant boundary).

use crate::id::{OrganizationId, ResourceId};

/// A record that belongs to exactly one organization.
///
/// The owning organization is fixed when the record is created. Stores must
/// reject updates that would move a record to another organization.
pub trait OrganizationOwned {
    fn organization_id(&self) -> OrganizationId;
}

impl<T: OrganizationOwned + ?Sized> OrganizationOwned for &T {
    fn organization_id(&self) -> OrganizationId {
        (**self).organization_id()
    }
}

/// A persisted, organization-owned record with its own identifier.
pub trait OwnedRecord: OrganizationOwned {
    /// Short record kind, used for storage naming and log fields.
    const KIND: &'static str;

    fn id(&self) -> ResourceId;
}
