use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopdesk_core::{DomainError, DomainResult, OrganizationId, OrganizationOwned, OwnedRecord, ResourceId};

/// Catalog product with its on-hand stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ResourceId,
    pub organization_id: OrganizationId,
    pub sku: String,
    pub name: String,
    /// Price in the smallest currency unit.
    pub price_cents: u64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub price_cents: u64,
    #[serde(default)]
    pub stock: i64,
}

/// Partial update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price_cents: Option<u64>,
    pub stock: Option<i64>,
}

impl Product {
    pub fn create(organization_id: OrganizationId, new: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        let sku = new.sku.trim();
        if sku.is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        let name = non_empty_name(&new.name)?;
        if new.stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }

        Ok(Self {
            id: ResourceId::new(),
            organization_id,
            sku: sku.to_uppercase(),
            name,
            price_cents: new.price_cents,
            stock: new.stock,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_update(&mut self, update: ProductUpdate, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(stock) = update.stock {
            if stock < 0 {
                return Err(DomainError::validation("stock cannot be negative"));
            }
        }
        if let Some(name) = &update.name {
            self.name = non_empty_name(name)?;
        }
        if let Some(price) = update.price_cents {
            self.price_cents = price;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        self.updated_at = now;
        Ok(())
    }
}

fn non_empty_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(name.to_string())
}

impl OrganizationOwned for Product {
    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }
}

impl OwnedRecord for Product {
    const KIND: &'static str = "product";

    fn id(&self) -> ResourceId {
        self.id
    }
}
