use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use validator::{Validate, ValidationError};

use crate::{
    commands::Command,
    errors::ServiceError,
    metrics::{record_failure, REQUEST_SUBMISSIONS},
    models::{validate_not_blank, NotificationCategory, PurchaseRequest, RequestStatus, Reviewable},
    notifications::NewNotification,
    WorkflowContext,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitPurchaseRequestCommand {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub item_name: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[validate(custom = "validate_cost")]
    pub estimated_cost: Decimal,
    #[validate(length(max = 1000))]
    pub justification: String,
}

fn validate_cost(cost: &Decimal) -> Result<(), ValidationError> {
    if cost.is_sign_negative() && !cost.is_zero() {
        return Err(ValidationError::new("negative_cost"));
    }
    Ok(())
}

#[async_trait]
impl Command for SubmitPurchaseRequestCommand {
    type Result = PurchaseRequest;

    #[instrument(skip(self, ctx), fields(item_name = %self.item_name, quantity = self.quantity))]
    async fn execute(&self, ctx: Arc<WorkflowContext>) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| record_failure(PurchaseRequest::KIND, e.into()))?;

        let request = PurchaseRequest {
            id: String::new(),
            item_name: self.item_name.trim().to_string(),
            quantity: self.quantity,
            estimated_cost: self.estimated_cost,
            justification: self.justification.trim().to_string(),
            status: RequestStatus::Pending,
            created_at: ctx.clock.now(),
            updated_at: None,
        };

        let request = ctx
            .repository::<PurchaseRequest>()
            .insert(request)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to persist purchase request");
                record_failure(PurchaseRequest::KIND, e.into())
            })?;

        ctx.notifications
            .emit(
                NewNotification::new(
                    "New Purchase Request",
                    format!(
                        "{} x {} requested (estimated {})",
                        request.quantity, request.item_name, request.estimated_cost
                    ),
                    NotificationCategory::Warning,
                )
                .correlated_to(&request.id),
            )
            .await
            .map_err(|e| record_failure(PurchaseRequest::KIND, e))?;

        REQUEST_SUBMISSIONS
            .with_label_values(&[PurchaseRequest::KIND])
            .inc();
        info!(request_id = %request.id, "Purchase request submitted");
        Ok(request)
    }
}
