use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::{
    auth::AuthMethod,
    commands::Command,
    errors::ServiceError,
    metrics::{record_failure, REQUEST_SUBMISSIONS},
    models::{validate_not_blank, AccessRequest, NotificationCategory, RequestStatus, Reviewable},
    notifications::NewNotification,
    WorkflowContext,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAccessRequestCommand {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub auth_method: AuthMethod,
}

#[async_trait]
impl Command for SubmitAccessRequestCommand {
    type Result = AccessRequest;

    #[instrument(skip(self, ctx), fields(email = %self.email))]
    async fn execute(&self, ctx: Arc<WorkflowContext>) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| record_failure(AccessRequest::KIND, e.into()))?;

        let requests = ctx.repository::<AccessRequest>();
        let existing = requests.all().await.map_err(|e| {
            error!(error = %e, "Failed to load access requests");
            record_failure(AccessRequest::KIND, e.into())
        })?;
        if existing
            .iter()
            .any(|r| r.status == RequestStatus::Pending && r.is_for(&self.email))
        {
            warn!("Duplicate access request");
            return Err(record_failure(
                AccessRequest::KIND,
                ServiceError::ValidationError(format!(
                    "An access request for {} is already pending",
                    self.email.trim()
                )),
            ));
        }

        let request = AccessRequest {
            id: String::new(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            auth_method: self.auth_method,
            status: RequestStatus::Pending,
            granted_role: None,
            account_id: None,
            created_at: ctx.clock.now(),
            updated_at: None,
        };
        let request = requests.insert(request).await.map_err(|e| {
            error!(error = %e, "Failed to persist access request");
            record_failure(AccessRequest::KIND, e.into())
        })?;

        ctx.notifications
            .emit(
                NewNotification::new(
                    "New Account Access Request",
                    format!(
                        "{} ({}) has requested access to the system.",
                        request.name, request.email
                    ),
                    NotificationCategory::Info,
                )
                .correlated_to(&request.id),
            )
            .await
            .map_err(|e| record_failure(AccessRequest::KIND, e))?;

        REQUEST_SUBMISSIONS
            .with_label_values(&[AccessRequest::KIND])
            .inc();
        info!(request_id = %request.id, "Access request submitted");
        Ok(request)
    }
}
