use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopdesk_core::{DomainError, DomainResult, OrganizationId, OrganizationOwned, OwnedRecord, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ResourceId,
    pub quantity: u32,
    pub unit_price_cents: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: ResourceId,
    pub organization_id: OrganizationId,
    pub customer_ref: String,
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_ref: String,
    pub lines: Vec<OrderLine>,
}

impl Order {
    pub fn place(organization_id: OrganizationId, new: NewOrder, now: DateTime<Utc>) -> DomainResult<Self> {
        let customer_ref = new.customer_ref.trim();
        if customer_ref.is_empty() {
            return Err(DomainError::validation("customer_ref cannot be empty"));
        }
        if new.lines.is_empty() {
            return Err(DomainError::validation("order must have at least one line"));
        }
        if new.lines.iter().any(|l| l.quantity == 0) {
            return Err(DomainError::validation("line quantity must be positive"));
        }

        Ok(Self {
            id: ResourceId::new(),
            organization_id,
            customer_ref: customer_ref.to_string(),
            lines: new.lines,
            status: OrderStatus::Open,
            created_at: now,
            cancelled_at: None,
        })
    }

    pub fn total_cents(&self) -> u64 {
        self.lines
            .iter()
            .map(|l| u64::from(l.quantity).saturating_mul(l.unit_price_cents))
            .fold(0u64, u64::saturating_add)
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status == OrderStatus::Cancelled {
            return Err(DomainError::invariant("order already cancelled"));
        }
        self.status = OrderStatus::Cancelled;
        self.cancelled_at = Some(now);
        Ok(())
    }
}

impl OrganizationOwned for Order {
    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }
}

impl OwnedRecord for Order {
    const KIND: &'static str = "order";

    fn id(&self) -> ResourceId {
        self.id
    }
}
