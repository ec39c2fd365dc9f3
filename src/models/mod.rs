//! Records persisted in the document store.

use chrono::{DateTime, Utc};
use validator::ValidationError;

use crate::repositories::Record;

pub mod access_request;
pub mod inventory_item;
pub mod notification_event;
pub mod purchase_request;
pub mod request_status;

pub use access_request::AccessRequest;
pub use inventory_item::InventoryItem;
pub use notification_event::{NotificationCategory, NotificationEvent};
pub use purchase_request::PurchaseRequest;
pub use request_status::RequestStatus;

/// A request that goes through the pending -> approved | rejected lifecycle.
pub trait Reviewable: Record {
    /// Short label used in log fields and metric labels.
    const KIND: &'static str;

    fn status(&self) -> RequestStatus;
    fn created_at(&self) -> DateTime<Utc>;
}

pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
