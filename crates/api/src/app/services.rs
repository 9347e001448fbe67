use std::sync::Arc;

use sqlx::PgPool;

use shopdesk_commerce::{Invoice, Order, Product};
use shopdesk_infra::{InMemoryScopedStore, PostgresScopedStore, ScopedStore, StoreError};

/// Stores backing the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<dyn ScopedStore<Product>>,
    pub orders: Arc<dyn ScopedStore<Order>>,
    pub invoices: Arc<dyn ScopedStore<Invoice>>,
}

impl AppServices {
    pub fn in_memory() -> Self {
        Self {
            products: Arc::new(InMemoryScopedStore::<Product>::new()),
            orders: Arc::new(InMemoryScopedStore::<Order>::new()),
            invoices: Arc::new(InMemoryScopedStore::<Invoice>::new()),
        }
    }

    pub async fn postgres(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        PostgresScopedStore::<Product>::ensure_schema(&pool).await?;

        Ok(Self {
            products: Arc::new(PostgresScopedStore::<Product>::new(pool.clone())),
            orders: Arc::new(PostgresScopedStore::<Order>::new(pool.clone())),
            invoices: Arc::new(PostgresScopedStore::<Invoice>::new(pool)),
        })
    }
}

/// Pick the store backend: Postgres when a database URL is configured,
/// in-memory otherwise.
pub async fn build_services(database_url: Option<&str>) -> Result<AppServices, StoreError> {
    match database_url {
        Some(url) => {
            tracing::info!("using postgres-backed stores");
            AppServices::postgres(url).await
        }
        None => {
            tracing::info!("using in-memory stores");
            Ok(AppServices::in_memory())
        }
    }
}
