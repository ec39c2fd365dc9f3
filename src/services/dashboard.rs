use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    errors::ServiceError,
    models::{AccessRequest, InventoryItem, PurchaseRequest, RequestStatus},
    WorkflowContext,
};

/// Headline counters for the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub stock_items: usize,
    pub low_stock_alerts: usize,
    pub pending_purchases: usize,
    pub pending_access_requests: usize,
    pub unread_notifications: usize,
}

#[derive(Clone)]
pub struct DashboardService {
    ctx: Arc<WorkflowContext>,
}

impl DashboardService {
    pub fn new(ctx: Arc<WorkflowContext>) -> Self {
        Self { ctx }
    }

    /// Counts read straight from the store; unread notifications come from
    /// the relay's loaded list.
    pub async fn stats(&self) -> Result<DashboardStats, ServiceError> {
        let items = self.ctx.repository::<InventoryItem>().all().await?;
        let purchases = self.ctx.repository::<PurchaseRequest>().all().await?;
        let access = self.ctx.repository::<AccessRequest>().all().await?;

        Ok(DashboardStats {
            stock_items: items.len(),
            low_stock_alerts: items.iter().filter(|i| i.tier().needs_restock()).count(),
            pending_purchases: purchases
                .iter()
                .filter(|r| r.status == RequestStatus::Pending)
                .count(),
            pending_access_requests: access
                .iter()
                .filter(|r| r.status == RequestStatus::Pending)
                .count(),
            unread_notifications: self.ctx.notifications.count_unread(),
        })
    }
}
