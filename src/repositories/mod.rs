use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::warn;

use crate::db::{Collection, Document, DocumentStore, Subscription};
use crate::errors::CollaboratorError;

pub mod inventory_repository;

pub use inventory_repository::InventoryRepository;

/// A typed record stored in one collection of the document store.
///
/// The identifier is assigned by the store and is not part of the stored body.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

/// Typed access to a single collection.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    fn decode(doc: Document) -> Result<T, CollaboratorError> {
        let mut record: T = serde_json::from_value(doc.data)?;
        record.set_id(doc.id);
        Ok(record)
    }

    /// Persists `record` and returns it with the assigned identifier.
    pub async fn insert(&self, mut record: T) -> Result<T, CollaboratorError> {
        let body = serde_json::to_value(&record)?;
        let id = self.store.create(T::COLLECTION, body).await?;
        record.set_id(id);
        Ok(record)
    }

    pub async fn find(&self, id: &str) -> Result<Option<T>, CollaboratorError> {
        self.store
            .get(T::COLLECTION, id)
            .await?
            .map(Self::decode)
            .transpose()
    }

    pub async fn all(&self) -> Result<Vec<T>, CollaboratorError> {
        self.store
            .list(T::COLLECTION)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    pub async fn patch(&self, id: &str, patch: Value) -> Result<(), CollaboratorError> {
        self.store.update(T::COLLECTION, id, patch).await
    }

    pub async fn remove(&self, id: &str) -> Result<(), CollaboratorError> {
        self.store.delete(T::COLLECTION, id).await
    }

    /// Typed change feed. Documents that fail to decode are skipped.
    pub fn watch(&self, callback: impl Fn(Vec<T>) + Send + Sync + 'static) -> Subscription {
        self.store.subscribe(
            T::COLLECTION,
            Arc::new(move |docs: Vec<Document>| {
                let records = docs
                    .into_iter()
                    .filter_map(|doc| {
                        let id = doc.id.clone();
                        match Self::decode(doc) {
                            Ok(record) => Some(record),
                            Err(e) => {
                                warn!(collection = %T::COLLECTION, %id, error = %e, "Skipping undecodable document");
                                None
                            }
                        }
                    })
                    .collect();
                callback(records);
            }),
        )
    }
}
