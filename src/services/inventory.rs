use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    commands::inventory_items::{
        AddStockItemCommand, AdjustStockCommand, AdjustStockResult, DeleteStockItemCommand,
        StockDirection,
    },
    commands::purchase_requests::SubmitPurchaseRequestCommand,
    commands::Command,
    errors::ServiceError,
    models::{InventoryItem, PurchaseRequest},
    repositories::InventoryRepository,
    services::stock_status::StockTier,
    WorkflowContext,
};

/// An item together with its derived tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLevel {
    pub item: InventoryItem,
    pub tier: StockTier,
}

impl From<InventoryItem> for StockLevel {
    fn from(item: InventoryItem) -> Self {
        let tier = item.tier();
        Self { item, tier }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub item: InventoryItem,
    pub tier: StockTier,
    pub shortage: u32,
}

/// Service for stock items, restocking and low-stock follow-up
#[derive(Clone)]
pub struct InventoryService {
    ctx: Arc<WorkflowContext>,
}

impl InventoryService {
    pub fn new(ctx: Arc<WorkflowContext>) -> Self {
        Self { ctx }
    }

    fn repository(&self) -> InventoryRepository {
        InventoryRepository::new(self.ctx.store.clone())
    }

    #[instrument(skip(self))]
    pub async fn add_item(&self, command: AddStockItemCommand) -> Result<StockLevel, ServiceError> {
        let item = command.execute(self.ctx.clone()).await?;
        Ok(item.into())
    }

    #[instrument(skip(self))]
    pub async fn restock(&self, item_id: &str, amount: u32) -> Result<AdjustStockResult, ServiceError> {
        self.adjust(item_id, StockDirection::Restock, amount).await
    }

    /// Takes `amount` units out of stock. Fails when fewer are on hand.
    #[instrument(skip(self))]
    pub async fn consume(&self, item_id: &str, amount: u32) -> Result<AdjustStockResult, ServiceError> {
        self.adjust(item_id, StockDirection::Consume, amount).await
    }

    async fn adjust(
        &self,
        item_id: &str,
        direction: StockDirection,
        amount: u32,
    ) -> Result<AdjustStockResult, ServiceError> {
        AdjustStockCommand {
            item_id: item_id.to_string(),
            direction,
            amount,
        }
        .execute(self.ctx.clone())
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, item_id: &str) -> Result<InventoryItem, ServiceError> {
        DeleteStockItemCommand {
            item_id: item_id.to_string(),
        }
        .execute(self.ctx.clone())
        .await
    }

    pub async fn get_item(&self, item_id: &str) -> Result<StockLevel, ServiceError> {
        self.repository()
            .find_by_id(item_id)
            .await?
            .map(StockLevel::from)
            .ok_or_else(|| ServiceError::NotFound(format!("Stock item {} not found", item_id)))
    }

    /// All items in store order, optionally restricted to one tier
    pub async fn list_items(&self, tier: Option<StockTier>) -> Result<Vec<StockLevel>, ServiceError> {
        let items = match tier {
            Some(tier) => self.repository().find_by_tier(tier).await?,
            None => self.repository().find_all().await?,
        };
        Ok(items.into_iter().map(StockLevel::from).collect())
    }

    /// Items below their minimum, critical ones first
    pub async fn low_stock_alerts(&self) -> Result<Vec<LowStockAlert>, ServiceError> {
        let mut alerts: Vec<LowStockAlert> = self
            .repository()
            .find_all()
            .await?
            .into_iter()
            .filter(|item| item.tier().needs_restock())
            .map(|item| LowStockAlert {
                tier: item.tier(),
                shortage: item.shortage(),
                item,
            })
            .collect();
        alerts.sort_by_key(|alert| alert.tier);
        Ok(alerts)
    }

    /// Raises a purchase request covering the item's shortage.
    #[instrument(skip(self))]
    pub async fn reorder(&self, item_id: &str) -> Result<PurchaseRequest, ServiceError> {
        let item = self.get_item(item_id).await?.item;
        let shortage = item.shortage();
        if shortage == 0 {
            warn!(current = item.current, minimum = item.minimum, "Nothing to reorder");
            return Err(ServiceError::ValidationError(format!(
                "{} is at or above its minimum of {}",
                item.name, item.minimum
            )));
        }

        let request = SubmitPurchaseRequestCommand {
            item_name: item.name.clone(),
            quantity: shortage,
            estimated_cost: Decimal::from(shortage) * self.ctx.config.reorder_unit_cost,
            justification: format!(
                "Low stock alert - Current: {}, Required: {}",
                item.current, item.minimum
            ),
        }
        .execute(self.ctx.clone())
        .await?;

        info!(request_id = %request.id, shortage, "Reorder requested");
        Ok(request)
    }
}
