//! Persistence facade over the hosted document store.
//!
//! Every record lives in a named [`Collection`] as a JSON object keyed by a
//! store-assigned identifier. The facade is deliberately narrow: create,
//! partial update, delete, point/collection reads and a change feed that
//! delivers the full current set of a collection on every change.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::errors::CollaboratorError;

pub use memory::InMemoryStore;

/// Collections used by the workflow.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Stock,
    Purchases,
    AccessRequests,
    Notifications,
}

/// A stored record: identifier plus the JSON object body (without the id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Receives the full current contents of a collection.
pub type SnapshotCallback = Arc<dyn Fn(Vec<Document>) + Send + Sync>;

/// Handle for an active change-feed registration.
///
/// Dropping the handle unsubscribes; keep it alive for as long as snapshots
/// are wanted.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Contract of the external document store.
///
/// Implementations own durability and cross-client conflict resolution.
/// Errors are reported as [`CollaboratorError`] and never retried by callers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts `record` (a JSON object) and returns the assigned identifier.
    async fn create(&self, collection: Collection, record: Value)
        -> Result<String, CollaboratorError>;

    /// Merges the top-level keys of `patch` into an existing document.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), CollaboratorError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), CollaboratorError>;

    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, CollaboratorError>;

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, CollaboratorError>;

    /// Registers `callback` for the collection. It receives the current set
    /// immediately and again after every change.
    fn subscribe(&self, collection: Collection, callback: SnapshotCallback) -> Subscription;
}
