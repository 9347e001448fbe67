use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use shopdesk_core::{DomainError, DomainResult, OrganizationId, OrganizationOwned, OwnedRecord, ResourceId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: ResourceId,
    pub organization_id: OrganizationId,
    pub number: String,
    pub order_id: Option<ResourceId>,
    pub amount_cents: u64,
    pub due_date: NaiveDate,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub number: String,
    #[serde(default)]
    pub order_id: Option<ResourceId>,
    pub amount_cents: u64,
    pub due_date: NaiveDate,
}

impl Invoice {
    pub fn issue(organization_id: OrganizationId, new: NewInvoice, now: DateTime<Utc>) -> DomainResult<Self> {
        let number = new.number.trim();
        if number.is_empty() {
            return Err(DomainError::validation("invoice number cannot be empty"));
        }
        if new.amount_cents == 0 {
            return Err(DomainError::validation("invoice amount must be positive"));
        }
        if new.due_date < now.date_naive() {
            return Err(DomainError::validation("due date cannot be in the past"));
        }

        Ok(Self {
            id: ResourceId::new(),
            organization_id,
            number: number.to_string(),
            order_id: new.order_id,
            amount_cents: new.amount_cents,
            due_date: new.due_date,
            issued_at: now,
        })
    }
}

impl OrganizationOwned for Invoice {
    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }
}

impl OwnedRecord for Invoice {
    const KIND: &'static str = "invoice";

    fn id(&self) -> ResourceId {
        self.id
    }
}
