use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use shopdesk_auth::OrganizationScope;
use shopdesk_core::{OrganizationId, OwnedRecord, ResourceId};

use super::{Page, PageRequest, ScopedStore, StoreError};

#[derive(Debug)]
struct Partitions<R> {
    by_org: HashMap<OrganizationId, BTreeMap<ResourceId, R>>,
    owner: HashMap<ResourceId, OrganizationId>,
}

/// In-memory store for tests/dev, partitioned by organization.
///
/// A scoped list only reads the scoped organization's partition.
#[derive(Debug)]
pub struct InMemoryScopedStore<R> {
    inner: RwLock<Partitions<R>>,
}

impl<R> InMemoryScopedStore<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Partitions {
                by_org: HashMap::new(),
                owner: HashMap::new(),
            }),
        }
    }
}

impl<R> Default for InMemoryScopedStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl<R> ScopedStore<R> for InMemoryScopedStore<R>
where
    R: OwnedRecord + Clone + Send + Sync + 'static,
{
    async fn get(&self, id: ResourceId) -> Result<Option<R>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let Some(org) = map.owner.get(&id) else {
            return Ok(None);
        };
        Ok(map.by_org.get(org).and_then(|p| p.get(&id)).cloned())
    }

    async fn list(&self, scope: OrganizationScope, page: PageRequest) -> Result<Page<R>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = page.per_page() as usize;

        let (total, items): (u64, Vec<R>) = match scope {
            OrganizationScope::Organization(org) => match map.by_org.get(&org) {
                Some(partition) => (
                    partition.len() as u64,
                    partition.values().skip(offset).take(limit).cloned().collect(),
                ),
                None => (0, Vec::new()),
            },
            OrganizationScope::All => {
                let mut all: Vec<&R> = map.by_org.values().flat_map(|p| p.values()).collect();
                all.sort_by_key(|r| r.id());
                (
                    all.len() as u64,
                    all.into_iter().skip(offset).take(limit).cloned().collect(),
                )
            }
        };

        Ok(Page {
            items,
            total,
            request: page,
        })
    }

    async fn insert(&self, record: R) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let id = record.id();
        if map.owner.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        let org = record.organization_id();
        map.owner.insert(id, org);
        map.by_org.entry(org).or_default().insert(id, record);
        Ok(())
    }

    async fn update(&self, record: R) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let id = record.id();
        let org = *map.owner.get(&id).ok_or(StoreError::NotFound(id))?;
        if org != record.organization_id() {
            return Err(StoreError::OrganizationChanged(id));
        }
        map.by_org.entry(org).or_default().insert(id, record);
        Ok(())
    }

    async fn delete(&self, id: ResourceId) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let Some(org) = map.owner.remove(&id) else {
            return Ok(false);
        };
        if let Some(partition) = map.by_org.get_mut(&org) {
            partition.remove(&id);
        }
        Ok(true)
    }
}
