//! Notification relay.
//!
//! Keeps a newest-first list of advisory events behind the notification
//! badge. Every mutation is persisted through the document store first and
//! applied to the loaded list only once the store confirms it. Delivery is
//! best effort: nothing here retries or queues.

use serde_json::json;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info, instrument};

use crate::clock::Clock;
use crate::db::{DocumentStore, Subscription};
use crate::errors::ServiceError;
use crate::models::{NotificationCategory, NotificationEvent};
use crate::repositories::Repository;

/// Fields supplied by the emitter; id, timestamp and read flag are assigned
/// by the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub category: NotificationCategory,
    pub request_id: Option<String>,
}

impl NewNotification {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        category: NotificationCategory,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            category,
            request_id: None,
        }
    }

    /// Ties the event to a request so it is cleared when the request is decided.
    pub fn correlated_to(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

pub struct NotificationRelay {
    repo: Repository<NotificationEvent>,
    clock: Arc<dyn Clock>,
    limit: usize,
    loaded: Arc<RwLock<Vec<NotificationEvent>>>,
}

fn newest_first(mut events: Vec<NotificationEvent>, limit: usize) -> Vec<NotificationEvent> {
    // Store order is insertion order; reversing first makes later inserts win ties.
    events.reverse();
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    events.truncate(limit);
    events
}

impl NotificationRelay {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, limit: usize) -> Self {
        Self {
            repo: Repository::new(store),
            clock,
            limit: limit.max(1),
            loaded: Arc::new(RwLock::new(Vec::new())),
        }
    }

    fn read_loaded(&self) -> RwLockReadGuard<'_, Vec<NotificationEvent>> {
        self.loaded.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_loaded(&self) -> RwLockWriteGuard<'_, Vec<NotificationEvent>> {
        self.loaded.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persists a new unread event and puts it at the head of the loaded list.
    #[instrument(skip(self, notification), fields(title = %notification.title))]
    pub async fn emit(
        &self,
        notification: NewNotification,
    ) -> Result<NotificationEvent, ServiceError> {
        let event = NotificationEvent {
            id: String::new(),
            title: notification.title,
            message: notification.message,
            category: notification.category,
            read: false,
            request_id: notification.request_id,
            created_at: self.clock.now(),
        };

        let event = self.repo.insert(event).await.map_err(|e| {
            error!(error = %e, "Failed to persist notification");
            ServiceError::from(e)
        })?;

        {
            let mut loaded = self.write_loaded();
            // An attached change feed may already have delivered it.
            if !loaded.iter().any(|e| e.id == event.id) {
                loaded.insert(0, event.clone());
            }
            loaded.truncate(self.limit);
        }

        debug!(notification_id = %event.id, category = %event.category, "Notification emitted");
        Ok(event)
    }

    /// Marks every loaded unread event as read and returns how many changed.
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self) -> Result<usize, ServiceError> {
        let unread: Vec<String> = self
            .read_loaded()
            .iter()
            .filter(|e| !e.read)
            .map(|e| e.id.clone())
            .collect();

        let mut marked = 0;
        for id in unread {
            match self.repo.patch(&id, json!({ "read": true })).await {
                Ok(()) => {
                    if let Some(event) = self.write_loaded().iter_mut().find(|e| e.id == id) {
                        event.read = true;
                    }
                    marked += 1;
                }
                Err(e) if e.is_missing_document() => {
                    self.write_loaded().retain(|event| event.id != id);
                }
                Err(e) => {
                    error!(notification_id = %id, error = %e, "Failed to mark notification read");
                    return Err(e.into());
                }
            }
        }

        info!(marked, "Notifications marked read");
        Ok(marked)
    }

    /// Removes one event. Returns `false` when it was already gone, which is
    /// not an error.
    #[instrument(skip(self))]
    pub async fn dismiss(&self, event_id: &str) -> Result<bool, ServiceError> {
        let removed_remotely = match self.repo.remove(event_id).await {
            Ok(()) => true,
            Err(e) if e.is_missing_document() => false,
            Err(e) => {
                error!(error = %e, "Failed to dismiss notification");
                return Err(e.into());
            }
        };

        let removed_locally = {
            let mut loaded = self.write_loaded();
            let before = loaded.len();
            loaded.retain(|e| e.id != event_id);
            loaded.len() != before
        };

        Ok(removed_remotely || removed_locally)
    }

    /// Removes every event correlated to `request_id`, stored or loaded.
    #[instrument(skip(self))]
    pub async fn dismiss_correlated(&self, request_id: &str) -> Result<usize, ServiceError> {
        let mut ids: Vec<String> = self
            .repo
            .all()
            .await?
            .into_iter()
            .filter(|e| e.is_correlated_to(request_id))
            .map(|e| e.id)
            .collect();

        for event in self.read_loaded().iter() {
            if event.is_correlated_to(request_id) && !ids.contains(&event.id) {
                ids.push(event.id.clone());
            }
        }

        let mut dismissed = 0;
        for id in ids {
            if self.dismiss(&id).await? {
                dismissed += 1;
            }
        }

        debug!(dismissed, "Correlated notifications dismissed");
        Ok(dismissed)
    }

    pub fn count_unread(&self) -> usize {
        self.read_loaded().iter().filter(|e| !e.read).count()
    }

    /// Snapshot of the loaded list, newest first.
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.read_loaded().clone()
    }

    /// Replaces the loaded list with the stored events.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<usize, ServiceError> {
        let events = newest_first(self.repo.all().await?, self.limit);
        let count = events.len();
        *self.write_loaded() = events;
        Ok(count)
    }

    /// Keeps the loaded list in sync with the store until the returned
    /// subscription is dropped.
    pub fn attach(&self) -> Subscription {
        let loaded = self.loaded.clone();
        let limit = self.limit;
        self.repo.watch(move |events| {
            *loaded.write().unwrap_or_else(PoisonError::into_inner) = newest_first(events, limit);
        })
    }
}
