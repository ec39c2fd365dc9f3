use std::sync::Arc;
use tracing::instrument;

use crate::{
    commands::purchase_requests::{
        ApprovePurchaseRequestCommand, ApprovePurchaseRequestResult, RejectPurchaseRequestCommand,
        SubmitPurchaseRequestCommand,
    },
    commands::Command,
    errors::ServiceError,
    models::{PurchaseRequest, RequestStatus},
    WorkflowContext,
};

use super::{filter_newest_first, RequestSummary};

/// Service for the purchase request lifecycle
#[derive(Clone)]
pub struct ProcurementService {
    ctx: Arc<WorkflowContext>,
}

impl ProcurementService {
    pub fn new(ctx: Arc<WorkflowContext>) -> Self {
        Self { ctx }
    }

    /// Records a new pending purchase request
    #[instrument(skip(self))]
    pub async fn submit(
        &self,
        command: SubmitPurchaseRequestCommand,
    ) -> Result<PurchaseRequest, ServiceError> {
        command.execute(self.ctx.clone()).await
    }

    /// Approves a pending request and reconciles it into the inventory
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        request_id: &str,
    ) -> Result<ApprovePurchaseRequestResult, ServiceError> {
        ApprovePurchaseRequestCommand {
            request_id: request_id.to_string(),
        }
        .execute(self.ctx.clone())
        .await
    }

    /// Rejects a pending request
    #[instrument(skip(self))]
    pub async fn reject(&self, request_id: &str) -> Result<PurchaseRequest, ServiceError> {
        RejectPurchaseRequestCommand {
            request_id: request_id.to_string(),
        }
        .execute(self.ctx.clone())
        .await
    }

    pub async fn get(&self, request_id: &str) -> Result<PurchaseRequest, ServiceError> {
        self.ctx
            .repository::<PurchaseRequest>()
            .find(request_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("purchase request {} not found", request_id)))
    }

    /// Requests newest first, optionally filtered by status
    pub async fn list(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<PurchaseRequest>, ServiceError> {
        let requests = self.ctx.repository::<PurchaseRequest>().all().await?;
        Ok(filter_newest_first(requests, status))
    }

    pub async fn summary(&self) -> Result<RequestSummary, ServiceError> {
        let requests = self.ctx.repository::<PurchaseRequest>().all().await?;
        Ok(RequestSummary::of(&requests))
    }
}
