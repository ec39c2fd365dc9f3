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
    models::{AccessRequest, RequestStatus, Reviewable},
    WorkflowContext,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RejectAccessRequestCommand {
    #[validate(length(min = 1))]
    pub request_id: String,
}

#[async_trait]
impl Command for RejectAccessRequestCommand {
    type Result = AccessRequest;

    #[instrument(skip(self, ctx), fields(request_id = %self.request_id))]
    async fn execute(&self, ctx: Arc<WorkflowContext>) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| record_failure(AccessRequest::KIND, e.into()))?;

        let requests = ctx.repository::<AccessRequest>();
        let mut request = load_pending(&requests, &self.request_id)
            .await
            .map_err(|e| {
                warn!(error = %e, "Access rejection refused");
                record_failure(AccessRequest::KIND, e)
            })?;

        let now = ctx.clock.now();
        requests
            .patch(
                &request.id,
                json!({ "status": RequestStatus::Rejected, "updated_at": now }),
            )
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to reject access request");
                record_failure(AccessRequest::KIND, e.into())
            })?;
        request.status = RequestStatus::Rejected;
        request.updated_at = Some(now);

        ctx.notifications
            .dismiss_correlated(&request.id)
            .await
            .map_err(|e| record_failure(AccessRequest::KIND, e))?;

        REQUEST_REJECTIONS
            .with_label_values(&[AccessRequest::KIND])
            .inc();
        info!(email = %request.email, "Access request rejected");
        Ok(request)
    }
}
