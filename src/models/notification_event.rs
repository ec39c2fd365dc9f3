use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::db::Collection;
use crate::repositories::Record;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationCategory {
    Success,
    Info,
    Warning,
    Error,
}

/// Advisory, user-facing event shown behind the notification badge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub title: String,
    pub message: String,
    pub category: NotificationCategory,
    #[serde(default)]
    pub read: bool,
    /// Request this event prompts action on, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn is_correlated_to(&self, request_id: &str) -> bool {
        self.request_id.as_deref() == Some(request_id)
    }
}

impl Record for NotificationEvent {
    const COLLECTION: Collection = Collection::Notifications;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
