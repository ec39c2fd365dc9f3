use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::db::DocumentStore;
use crate::errors::CollaboratorError;
use crate::models::InventoryItem;
use crate::services::stock_status::StockTier;

use super::Repository;

/// Repository for stock items
#[derive(Clone)]
pub struct InventoryRepository {
    base: Repository<InventoryItem>,
}

impl InventoryRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: Repository::new(store),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<InventoryItem>, CollaboratorError> {
        self.base.find(id).await
    }

    /// First item whose name matches `name` ignoring case and surrounding
    /// whitespace, in store order.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<InventoryItem>, CollaboratorError> {
        Ok(self
            .base
            .all()
            .await?
            .into_iter()
            .find(|item| item.matches_name(name)))
    }

    pub async fn find_all(&self) -> Result<Vec<InventoryItem>, CollaboratorError> {
        self.base.all().await
    }

    /// Items currently in `tier`, in store order.
    pub async fn find_by_tier(&self, tier: StockTier) -> Result<Vec<InventoryItem>, CollaboratorError> {
        Ok(self
            .base
            .all()
            .await?
            .into_iter()
            .filter(|item| item.tier() == tier)
            .collect())
    }

    pub async fn create(&self, item: InventoryItem) -> Result<InventoryItem, CollaboratorError> {
        self.base.insert(item).await
    }

    /// Writes a new current quantity. Only `current` and `updated_at` change.
    pub async fn set_quantity(
        &self,
        id: &str,
        current: u32,
        at: DateTime<Utc>,
    ) -> Result<(), CollaboratorError> {
        self.base
            .patch(id, json!({ "current": current, "updated_at": at }))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), CollaboratorError> {
        self.base.remove(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;

    fn item(name: &str, current: u32, minimum: u32) -> InventoryItem {
        InventoryItem {
            id: String::new(),
            name: name.into(),
            category: "Stationery".into(),
            current,
            minimum,
            unit: "pcs".into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn finds_items_by_normalized_name() {
        let repo = InventoryRepository::new(Arc::new(InMemoryStore::new()));
        let markers = repo.create(item("Whiteboard Markers", 45, 50)).await.unwrap();
        repo.create(item("A4 Paper Reams", 120, 50)).await.unwrap();

        let found = repo.find_by_name(" whiteboard markers").await.unwrap();
        assert_eq!(found.map(|i| i.id), Some(markers.id));
        assert!(repo.find_by_name("Markers").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_quantity_leaves_other_fields_alone() {
        let repo = InventoryRepository::new(Arc::new(InMemoryStore::new()));
        let created = repo.create(item("Ink", 8, 15)).await.unwrap();
        let at = Utc::now();

        repo.set_quantity(&created.id, 20, at).await.unwrap();

        let stored = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.current, 20);
        assert_eq!(stored.minimum, 15);
        assert_eq!(stored.name, "Ink");
        assert_eq!(stored.updated_at, Some(at));
        assert_eq!(stored.tier(), StockTier::Good);
    }

    #[tokio::test]
    async fn filters_by_tier() {
        let repo = InventoryRepository::new(Arc::new(InMemoryStore::new()));
        repo.create(item("Markers", 45, 50)).await.unwrap();
        repo.create(item("Ink", 7, 15)).await.unwrap();
        repo.create(item("Paper", 120, 50)).await.unwrap();

        let critical = repo.find_by_tier(StockTier::Critical).await.unwrap();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].name, "Ink");
    }
}
