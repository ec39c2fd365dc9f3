use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{RequestStatus, Reviewable};
use crate::WorkflowContext;

// Request lifecycles
pub mod access;
pub mod procurement;

// Stock
pub mod inventory;
pub mod stock_status;

pub mod dashboard;

use access::AccessService;
use dashboard::DashboardService;
use inventory::InventoryService;
use procurement::ProcurementService;

/// Per-status request counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSummary {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl RequestSummary {
    pub fn of<T: Reviewable>(requests: &[T]) -> Self {
        requests
            .iter()
            .fold(Self::default(), |mut summary, request| {
                match request.status() {
                    RequestStatus::Pending => summary.pending += 1,
                    RequestStatus::Approved => summary.approved += 1,
                    RequestStatus::Rejected => summary.rejected += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }
}

/// Newest first, optionally restricted to one status.
pub(crate) fn filter_newest_first<T: Reviewable>(
    mut requests: Vec<T>,
    status: Option<RequestStatus>,
) -> Vec<T> {
    if let Some(status) = status {
        requests.retain(|r| r.status() == status);
    }
    requests.reverse();
    requests.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    requests
}

/// All workflow services over one shared context.
#[derive(Clone)]
pub struct WorkflowServices {
    pub procurement: ProcurementService,
    pub access: AccessService,
    pub inventory: InventoryService,
    pub dashboard: DashboardService,
}

impl WorkflowServices {
    pub fn new(ctx: Arc<WorkflowContext>) -> Self {
        Self {
            procurement: ProcurementService::new(ctx.clone()),
            access: AccessService::new(ctx.clone()),
            inventory: InventoryService::new(ctx.clone()),
            dashboard: DashboardService::new(ctx),
        }
    }
}
