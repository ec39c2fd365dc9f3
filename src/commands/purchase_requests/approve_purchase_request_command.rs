use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::{
    commands::{load_pending, Command},
    errors::ServiceError,
    metrics::{record_failure, REQUEST_APPROVALS},
    models::{InventoryItem, NotificationCategory, PurchaseRequest, RequestStatus, Reviewable},
    notifications::NewNotification,
    repositories::InventoryRepository,
    services::stock_status::StockTier,
    WorkflowContext,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApprovePurchaseRequestCommand {
    #[validate(length(min = 1))]
    pub request_id: String,
}

/// How the approved quantity reached the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StockReconciliation {
    /// An existing item was topped up from `previous` units.
    Restocked { previous: u32 },
    /// No item matched by name; a new one was created.
    Created,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovePurchaseRequestResult {
    pub request: PurchaseRequest,
    pub item: InventoryItem,
    pub tier: StockTier,
    pub reconciliation: StockReconciliation,
}

fn failed(err: impl Into<ServiceError>) -> ServiceError {
    let err = err.into();
    if err.is_local() {
        warn!(error = %err, "Purchase approval refused");
    } else {
        error!(error = %err, "Purchase approval failed");
    }
    record_failure(PurchaseRequest::KIND, err)
}

#[async_trait]
impl Command for ApprovePurchaseRequestCommand {
    type Result = ApprovePurchaseRequestResult;

    #[instrument(skip(self, ctx), fields(request_id = %self.request_id))]
    async fn execute(&self, ctx: Arc<WorkflowContext>) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(failed)?;

        let purchases = ctx.repository::<PurchaseRequest>();
        let mut request = load_pending(&purchases, &self.request_id)
            .await
            .map_err(failed)?;

        let inventory = InventoryRepository::new(ctx.store.clone());
        let now = ctx.clock.now();

        let (item, reconciliation) = match inventory
            .find_by_name(&request.item_name)
            .await
            .map_err(failed)?
        {
            Some(mut item) => {
                let previous = item.current;
                item.current = previous.checked_add(request.quantity).ok_or_else(|| {
                    failed(ServiceError::ValidationError(format!(
                        "Cannot add {} to {}: {} on hand would exceed the stock limit",
                        request.quantity, item.name, previous
                    )))
                })?;
                item.updated_at = Some(now);
                inventory
                    .set_quantity(&item.id, item.current, now)
                    .await
                    .map_err(failed)?;
                (item, StockReconciliation::Restocked { previous })
            }
            None => {
                let item = InventoryItem {
                    id: String::new(),
                    name: request.item_name.clone(),
                    category: ctx.config.new_item_category.clone(),
                    current: request.quantity,
                    minimum: ctx.config.minimum_for_new_item(request.quantity),
                    unit: ctx.config.new_item_unit.clone(),
                    created_at: now,
                    updated_at: None,
                };
                let item = inventory.create(item).await.map_err(failed)?;
                (item, StockReconciliation::Created)
            }
        };

        purchases
            .patch(
                &request.id,
                json!({ "status": RequestStatus::Approved, "updated_at": now }),
            )
            .await
            .map_err(failed)?;
        request.status = RequestStatus::Approved;
        request.updated_at = Some(now);

        ctx.notifications
            .dismiss_correlated(&request.id)
            .await
            .map_err(failed)?;
        ctx.notifications
            .emit(NewNotification::new(
                "Purchase Approved",
                format!(
                    "{} x {} added to inventory ({} on hand)",
                    request.quantity, item.name, item.current
                ),
                NotificationCategory::Success,
            ))
            .await
            .map_err(failed)?;

        REQUEST_APPROVALS
            .with_label_values(&[PurchaseRequest::KIND])
            .inc();
        let tier = item.tier();
        info!(item_id = %item.id, current = item.current, %tier, "Purchase request approved");

        Ok(ApprovePurchaseRequestResult {
            request,
            item,
            tier,
            reconciliation,
        })
    }
}
