use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{Collection, Document, DocumentStore, SnapshotCallback, Subscription};
use crate::errors::CollaboratorError;

/// In-process document store used for tests, demos and local development.
///
/// Documents keep insertion order per collection. Subscribers are invoked
/// synchronously after each successful write, outside of any internal lock.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    collections: DashMap<Collection, Vec<Document>>,
    subscribers: DashMap<u64, (Collection, SnapshotCallback)>,
    next_subscriber: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub fn len(&self, collection: Collection) -> usize {
        self.inner
            .collections
            .get(&collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    fn snapshot(&self, collection: Collection) -> Vec<Document> {
        self.inner
            .collections
            .get(&collection)
            .map(|docs| docs.value().clone())
            .unwrap_or_default()
    }

    fn notify(&self, collection: Collection) {
        let callbacks: Vec<SnapshotCallback> = self
            .inner
            .subscribers
            .iter()
            .filter(|entry| entry.value().0 == collection)
            .map(|entry| entry.value().1.clone())
            .collect();

        if callbacks.is_empty() {
            return;
        }

        let snapshot = self.snapshot(collection);
        debug!(%collection, subscribers = callbacks.len(), "Delivering snapshot");
        for callback in callbacks {
            callback(snapshot.clone());
        }
    }
}

fn ensure_object(record: &Value) -> Result<(), CollaboratorError> {
    if record.is_object() {
        Ok(())
    } else {
        Err(CollaboratorError::InvalidArgument(
            "documents must be JSON objects".to_string(),
        ))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    #[instrument(skip(self, record))]
    async fn create(
        &self,
        collection: Collection,
        record: Value,
    ) -> Result<String, CollaboratorError> {
        ensure_object(&record)?;
        let id = Uuid::new_v4().to_string();
        self.inner
            .collections
            .entry(collection)
            .or_default()
            .push(Document {
                id: id.clone(),
                data: record,
            });
        self.notify(collection);
        Ok(id)
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<(), CollaboratorError> {
        let Value::Object(fields) = patch else {
            return Err(CollaboratorError::InvalidArgument(
                "updates must be JSON objects".to_string(),
            ));
        };

        {
            let mut docs = self.inner.collections.entry(collection).or_default();
            let doc = docs.iter_mut().find(|doc| doc.id == id).ok_or_else(|| {
                CollaboratorError::MissingDocument {
                    collection,
                    id: id.to_string(),
                }
            })?;
            if let Value::Object(body) = &mut doc.data {
                for (key, value) in fields {
                    body.insert(key, value);
                }
            }
        }

        self.notify(collection);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), CollaboratorError> {
        {
            let mut docs = self.inner.collections.entry(collection).or_default();
            let position = docs.iter().position(|doc| doc.id == id).ok_or_else(|| {
                CollaboratorError::MissingDocument {
                    collection,
                    id: id.to_string(),
                }
            })?;
            docs.remove(position);
        }

        self.notify(collection);
        Ok(())
    }

    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, CollaboratorError> {
        Ok(self
            .inner
            .collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id).cloned()))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, CollaboratorError> {
        Ok(self.snapshot(collection))
    }

    fn subscribe(&self, collection: Collection, callback: SnapshotCallback) -> Subscription {
        let key = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .insert(key, (collection, callback.clone()));

        callback(self.snapshot(collection));

        let registry: Weak<Inner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = registry.upgrade() {
                inner.subscribers.remove(&key);
            }
        })
    }
}
