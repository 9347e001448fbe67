use axum::{Router, routing::get};

use shopdesk_auth::{Principal, ensure_owned_access, organization_scope};
use shopdesk_core::OwnedRecord;
use shopdesk_infra::ScopedStore;

use crate::app::dto;
use crate::app::errors::{ApiError, ApiResult};
use crate::guard::Gates;

pub mod admin;
pub mod invoices;
pub mod orders;
pub mod products;
pub mod system;

/// Router for all authenticated (organization-scoped) endpoints.
pub fn router(gates: &Gates) -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/products", products::router(gates))
        .nest("/orders", orders::router(gates))
        .nest("/accounting", invoices::router(gates))
        .nest("/admin", admin::router(gates))
}

/// Fetch a record by its raw path id and check the caller may touch it.
///
/// Principals without an organization are refused before the lookup.
pub(crate) async fn load_owned<R>(store: &dyn ScopedStore<R>, principal: &Principal, raw_id: &str) -> ApiResult<R>
where
    R: OwnedRecord + Send + Sync + 'static,
{
    organization_scope(principal)?;
    let id = dto::parse_resource_id(raw_id)?;
    let record = store.get(id).await?.ok_or(ApiError::NotFound(R::KIND))?;
    ensure_owned_access(principal, &record)?;
    Ok(record)
}
