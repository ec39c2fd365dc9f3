use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::Collection;
use crate::repositories::Record;

use super::{RequestStatus, Reviewable};

/// Request to buy `quantity` units of `item_name`. Approval reconciles the
/// quantity into the matching inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub item_name: String,
    pub quantity: u32,
    pub estimated_cost: Decimal,
    pub justification: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for PurchaseRequest {
    const COLLECTION: Collection = Collection::Purchases;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Reviewable for PurchaseRequest {
    const KIND: &'static str = "purchase";

    fn status(&self) -> RequestStatus {
        self.status
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
