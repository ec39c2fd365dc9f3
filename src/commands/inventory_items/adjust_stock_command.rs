use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{AsRefStr, Display};
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::{
    commands::Command,
    errors::ServiceError,
    metrics::STOCK_ADJUSTMENTS,
    models::{InventoryItem, NotificationCategory},
    notifications::NewNotification,
    repositories::InventoryRepository,
    services::stock_status::StockTier,
    WorkflowContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StockDirection {
    Restock,
    Consume,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdjustStockCommand {
    #[validate(length(min = 1))]
    pub item_id: String,
    pub direction: StockDirection,
    #[validate(range(min = 1))]
    pub amount: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustStockResult {
    pub item: InventoryItem,
    pub previous: u32,
    pub previous_tier: StockTier,
    pub tier: StockTier,
}

#[async_trait]
impl Command for AdjustStockCommand {
    type Result = AdjustStockResult;

    #[instrument(skip(self, ctx), fields(item_id = %self.item_id, direction = %self.direction, amount = self.amount))]
    async fn execute(&self, ctx: Arc<WorkflowContext>) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let inventory = InventoryRepository::new(ctx.store.clone());
        let mut item = inventory
            .find_by_id(&self.item_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Stock item {} not found", self.item_id)))?;

        let previous = item.current;
        let previous_tier = item.tier();
        item.current = match self.direction {
            StockDirection::Restock => previous.checked_add(self.amount).ok_or_else(|| {
                warn!(current = previous, "Restock exceeds the stock limit");
                ServiceError::ValidationError(format!(
                    "Cannot restock {} {}: {} on hand would exceed the stock limit",
                    self.amount, item.unit, previous
                ))
            })?,
            StockDirection::Consume => previous.checked_sub(self.amount).ok_or_else(|| {
                warn!(current = previous, "Consumption exceeds stock on hand");
                ServiceError::ValidationError(format!(
                    "Cannot consume {} {}: only {} on hand",
                    self.amount, item.unit, previous
                ))
            })?,
        };

        let now = ctx.clock.now();
        inventory
            .set_quantity(&item.id, item.current, now)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to adjust stock");
                ServiceError::from(e)
            })?;
        item.updated_at = Some(now);

        let tier = item.tier();
        if tier == StockTier::Critical && previous_tier != StockTier::Critical {
            ctx.notifications
                .emit(NewNotification::new(
                    "Critical Stock Level",
                    format!(
                        "{} is down to {} {} (minimum {})",
                        item.name, item.current, item.unit, item.minimum
                    ),
                    NotificationCategory::Error,
                ))
                .await?;
        }

        STOCK_ADJUSTMENTS
            .with_label_values(&[self.direction.as_ref()])
            .inc();
        info!(previous, current = item.current, %tier, "Stock adjusted");
        Ok(AdjustStockResult {
            item,
            previous,
            previous_tier,
            tier,
        })
    }
}
