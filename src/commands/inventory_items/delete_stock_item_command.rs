use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    commands::Command, errors::ServiceError, models::InventoryItem,
    repositories::InventoryRepository, WorkflowContext,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeleteStockItemCommand {
    #[validate(length(min = 1))]
    pub item_id: String,
}

#[async_trait]
impl Command for DeleteStockItemCommand {
    type Result = InventoryItem;

    #[instrument(skip(self, ctx), fields(item_id = %self.item_id))]
    async fn execute(&self, ctx: Arc<WorkflowContext>) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let inventory = InventoryRepository::new(ctx.store.clone());
        let item = inventory
            .find_by_id(&self.item_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Stock item {} not found", self.item_id)))?;

        inventory.delete(&item.id).await?;

        info!(name = %item.name, "Stock item deleted");
        Ok(item)
    }
}
