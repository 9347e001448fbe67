//! `shopdesk-core`: shared identifiers and domain primitives.
//!
//! This crate has no HTTP, storage, or policy concerns.

pub mod error;
pub mod id;
pub mod owned;

pub use error::{DomainError, DomainResult};
pub use id::{OrganizationId, ResourceId};
pub use owned::{OrganizationOwned, OwnedRecord};
