use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::{
    commands::{load_pending, Command},
    errors::ServiceError,
    metrics::{record_failure, REQUEST_REJECTIONS},
    models::{PurchaseRequest, RequestStatus, Reviewable},
    WorkflowContext,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RejectPurchaseRequestCommand {
    #[validate(length(min = 1))]
    pub request_id: String,
}

#[async_trait]
impl Command for RejectPurchaseRequestCommand {
    type Result = PurchaseRequest;

    #[instrument(skip(self, ctx), fields(request_id = %self.request_id))]
    async fn execute(&self, ctx: Arc<WorkflowContext>) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| record_failure(PurchaseRequest::KIND, e.into()))?;

        let purchases = ctx.repository::<PurchaseRequest>();
        let mut request = load_pending(&purchases, &self.request_id)
            .await
            .map_err(|e| {
                warn!(error = %e, "Purchase rejection refused");
                record_failure(PurchaseRequest::KIND, e)
            })?;

        let now = ctx.clock.now();
        purchases
            .patch(
                &request.id,
                json!({ "status": RequestStatus::Rejected, "updated_at": now }),
            )
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to reject purchase request");
                record_failure(PurchaseRequest::KIND, e.into())
            })?;
        request.status = RequestStatus::Rejected;
        request.updated_at = Some(now);

        ctx.notifications
            .dismiss_correlated(&request.id)
            .await
            .map_err(|e| record_failure(PurchaseRequest::KIND, e))?;

        REQUEST_REJECTIONS
            .with_label_values(&[PurchaseRequest::KIND])
            .inc();
        info!("Purchase request rejected");
        Ok(request)
    }
}
