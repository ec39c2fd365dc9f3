#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use school_assets::{
    auth::{AuthMethod, InMemoryAccounts},
    clock::ManualClock,
    commands::{
        access_requests::SubmitAccessRequestCommand, inventory_items::AddStockItemCommand,
        purchase_requests::SubmitPurchaseRequestCommand,
    },
    config::WorkflowConfig,
    db::{Collection, Document, DocumentStore, InMemoryStore, SnapshotCallback, Subscription},
    errors::CollaboratorError,
    models::{AccessRequest, InventoryItem, PurchaseRequest},
    WorkflowContext, WorkflowServices,
};

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Create,
    Update,
    Delete,
    Get,
    List,
}

/// In-memory store that fails selected operations on demand.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: InMemoryStore,
    failures: Mutex<Vec<(Collection, StoreOp)>>,
}

impl FaultyStore {
    /// The next `op` on `collection` fails with `Unavailable`.
    pub fn fail_next(&self, collection: Collection, op: StoreOp) {
        self.failures.lock().unwrap().push((collection, op));
    }

    fn check(&self, collection: Collection, op: StoreOp) -> Result<(), CollaboratorError> {
        let mut failures = self.failures.lock().unwrap();
        match failures.iter().position(|f| *f == (collection, op)) {
            Some(index) => {
                failures.remove(index);
                Err(CollaboratorError::Unavailable(format!(
                    "injected {:?} failure on {}",
                    op, collection
                )))
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn create(&self, collection: Collection, record: Value) -> Result<String, CollaboratorError> {
        self.check(collection, StoreOp::Create)?;
        self.inner.create(collection, record).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), CollaboratorError> {
        self.check(collection, StoreOp::Update)?;
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), CollaboratorError> {
        self.check(collection, StoreOp::Delete)?;
        self.inner.delete(collection, id).await
    }

    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, CollaboratorError> {
        self.check(collection, StoreOp::Get)?;
        self.inner.get(collection, id).await
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, CollaboratorError> {
        self.check(collection, StoreOp::List)?;
        self.inner.list(collection).await
    }

    fn subscribe(&self, collection: Collection, callback: SnapshotCallback) -> Subscription {
        self.inner.subscribe(collection, callback)
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap()
}

/// Workflow wired to in-memory collaborators and a clock that ticks one
/// second per reading.
pub struct TestWorkflow {
    pub ctx: Arc<WorkflowContext>,
    pub store: Arc<FaultyStore>,
    pub accounts: Arc<InMemoryAccounts>,
    pub clock: Arc<ManualClock>,
    pub services: WorkflowServices,
}

impl TestWorkflow {
    pub fn new() -> Self {
        Self::with_config(WorkflowConfig::default())
    }

    pub fn with_config(config: WorkflowConfig) -> Self {
        let clock = Arc::new(ManualClock::with_step(start_time(), Duration::seconds(1)));
        let store = Arc::new(FaultyStore::default());
        let accounts = Arc::new(InMemoryAccounts::with_default_users(clock.clone()).unwrap());
        let ctx = Arc::new(WorkflowContext::new(
            store.clone(),
            accounts.clone(),
            clock.clone(),
            config,
        ));
        let services = WorkflowServices::new(ctx.clone());
        Self {
            ctx,
            store,
            accounts,
            clock,
            services,
        }
    }

    pub async fn seed_item(&self, name: &str, current: u32, minimum: u32) -> InventoryItem {
        self.services
            .inventory
            .add_item(AddStockItemCommand {
                name: name.to_string(),
                category: "Stationery".to_string(),
                current,
                minimum,
                unit: "pcs".to_string(),
            })
            .await
            .unwrap()
            .item
    }

    pub async fn item(&self, id: &str) -> InventoryItem {
        self.services.inventory.get_item(id).await.unwrap().item
    }

    pub async fn submit_purchase(&self, item_name: &str, quantity: u32) -> PurchaseRequest {
        self.services
            .procurement
            .submit(SubmitPurchaseRequestCommand {
                item_name: item_name.to_string(),
                quantity,
                estimated_cost: Decimal::from(quantity) * Decimal::from(12),
                justification: "Needed for next term".to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn submit_access(&self, name: &str, email: &str) -> AccessRequest {
        self.services
            .access
            .submit(SubmitAccessRequestCommand {
                name: name.to_string(),
                email: email.to_string(),
                auth_method: AuthMethod::Google,
            })
            .await
            .unwrap()
    }

    /// Notifications currently stored, regardless of what the relay has loaded.
    pub async fn stored_notifications(&self) -> Vec<Document> {
        self.store.inner.list(Collection::Notifications).await.unwrap()
    }
}
