//! Postgres-backed scoped store.
//!
//! Records live in one `scoped_records` table keyed by `(kind, id)` with the
//! record serialized into a JSONB `body`. `organization_id` is duplicated
//! into its own column so scoped queries filter in SQL.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use shopdesk_auth::OrganizationScope;
use shopdesk_core::{OwnedRecord, ResourceId};

use super::query::{scoped_count_query, scoped_list_query};
use super::{Page, PageRequest, ScopedStore, StoreError};

/// Schema applied by [`PostgresScopedStore::ensure_schema`].
pub const SCHEMA: &str = include_str!("../../migrations/0001_scoped_records.sql");

pub struct PostgresScopedStore<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R> PostgresScopedStore<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    /// Create the backing table if it does not exist yet.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(pool).await?;
        Ok(())
    }
}

impl<R> core::fmt::Debug for PostgresScopedStore<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PostgresScopedStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl<R> ScopedStore<R> for PostgresScopedStore<R>
where
    R: OwnedRecord + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, id: ResourceId) -> Result<Option<R>, StoreError> {
        let row = sqlx::query("SELECT body FROM scoped_records WHERE kind = $1 AND id = $2")
            .bind(R::KIND)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get::<Json<R>, _>("body")?.0)),
            None => Ok(None),
        }
    }

    async fn list(&self, scope: OrganizationScope, page: PageRequest) -> Result<Page<R>, StoreError> {
        let total: i64 = scoped_count_query(R::KIND, &scope)
            .build()
            .fetch_one(&self.pool)
            .await?
            .try_get("total")?;

        let rows = scoped_list_query(R::KIND, &scope, page)
            .build()
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(|row| row.try_get::<Json<R>, _>("body").map(|j| j.0))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(kind = R::KIND, ?scope, total, returned = items.len(), "scoped_list");

        Ok(Page {
            items,
            total: u64::try_from(total).unwrap_or(0),
            request: page,
        })
    }

    async fn insert(&self, record: R) -> Result<(), StoreError> {
        let id = record.id();
        let result = sqlx::query(
            r#"
            INSERT INTO scoped_records (kind, id, organization_id, body)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (kind, id) DO NOTHING
            "#,
        )
        .bind(R::KIND)
        .bind(id.as_uuid())
        .bind(record.organization_id().as_uuid())
        .bind(Json(&record))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate(id));
        }
        Ok(())
    }

    async fn update(&self, record: R) -> Result<(), StoreError> {
        let id = record.id();
        let result = sqlx::query(
            r#"
            UPDATE scoped_records
            SET body = $4, updated_at = NOW()
            WHERE kind = $1 AND id = $2 AND organization_id = $3
            "#,
        )
        .bind(R::KIND)
        .bind(id.as_uuid())
        .bind(record.organization_id().as_uuid())
        .bind(Json(&record))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Nothing matched: either the record is gone or its owner differs.
        let exists = sqlx::query("SELECT 1 FROM scoped_records WHERE kind = $1 AND id = $2")
            .bind(R::KIND)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .is_some();

        if exists {
            Err(StoreError::OrganizationChanged(id))
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    async fn delete(&self, id: ResourceId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM scoped_records WHERE kind = $1 AND id = $2")
            .bind(R::KIND)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
