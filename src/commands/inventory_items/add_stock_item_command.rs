use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use validator::Validate;

use crate::{
    commands::Command,
    errors::ServiceError,
    models::{validate_not_blank, InventoryItem},
    repositories::InventoryRepository,
    WorkflowContext,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddStockItemCommand {
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    pub current: u32,
    pub minimum: u32,
    #[validate(length(min = 1, max = 20))]
    pub unit: String,
}

#[async_trait]
impl Command for AddStockItemCommand {
    type Result = InventoryItem;

    #[instrument(skip(self, ctx), fields(name = %self.name))]
    async fn execute(&self, ctx: Arc<WorkflowContext>) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let inventory = InventoryRepository::new(ctx.store.clone());
        if inventory.find_by_name(&self.name).await?.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "A stock item named {} already exists",
                self.name.trim()
            )));
        }

        let item = InventoryItem {
            id: String::new(),
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            current: self.current,
            minimum: self.minimum,
            unit: self.unit.trim().to_string(),
            created_at: ctx.clock.now(),
            updated_at: None,
        };
        let item = inventory.create(item).await.map_err(|e| {
            error!(error = %e, "Failed to create stock item");
            ServiceError::from(e)
        })?;

        info!(item_id = %item.id, tier = %item.tier(), "Stock item added");
        Ok(item)
    }
}
