//! Tenant-scoped record storage.
//!
//! List operations take the caller's [`OrganizationScope`] and apply it while
//! building the query; they never fetch every tenant's rows and filter
//! afterwards. Fetch-by-id is unscoped on purpose: the caller validates the
//! returned record's owner before exposing or mutating it.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use shopdesk_auth::OrganizationScope;
use shopdesk_core::{OwnedRecord, ResourceId};

pub mod in_memory;
pub mod postgres;
pub mod query;

pub use in_memory::InMemoryScopedStore;
pub use postgres::PostgresScopedStore;

pub const DEFAULT_PER_PAGE: u32 = 25;
pub const MAX_PER_PAGE: u32 = 100;

/// 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<R> {
    pub items: Vec<R>,
    /// Records matching the scope across all pages.
    pub total: u64,
    pub request: PageRequest,
}

impl<R> Page<R> {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.request.per_page()))
    }

    pub fn map<T>(self, f: impl FnMut(R) -> T) -> Page<T> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(ResourceId),

    #[error("record {0} already exists")]
    Duplicate(ResourceId),

    #[error("record {0} cannot move to another organization")]
    OrganizationChanged(ResourceId),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait ScopedStore<R>: Send + Sync
where
    R: OwnedRecord + Send + Sync + 'static,
{
    async fn get(&self, id: ResourceId) -> Result<Option<R>, StoreError>;

    /// Records visible in `scope`, ordered by id (creation order).
    async fn list(&self, scope: OrganizationScope, page: PageRequest) -> Result<Page<R>, StoreError>;

    async fn insert(&self, record: R) -> Result<(), StoreError>;

    /// Replace an existing record. The owning organization must not change.
    async fn update(&self, record: R) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: ResourceId) -> Result<bool, StoreError>;
}
