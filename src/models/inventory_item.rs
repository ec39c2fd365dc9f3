use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::Collection;
use crate::repositories::Record;
use crate::services::stock_status::{classify, StockTier};

use super::validate_not_blank;

/// A stocked consumable. The severity tier is derived from `current` and
/// `minimum` on every read and is never written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InventoryItem {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    pub current: u32,
    pub minimum: u32,
    #[validate(length(min = 1, max = 20))]
    pub unit: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl InventoryItem {
    pub fn tier(&self) -> StockTier {
        classify(i64::from(self.current), i64::from(self.minimum))
    }

    /// Units missing to reach the minimum threshold.
    pub fn shortage(&self) -> u32 {
        self.minimum.saturating_sub(self.current)
    }

    /// Case-insensitive comparison ignoring surrounding whitespace.
    pub fn matches_name(&self, name: &str) -> bool {
        normalize_name(&self.name) == normalize_name(name)
    }
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Record for InventoryItem {
    const COLLECTION: Collection = Collection::Stock;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, current: u32, minimum: u32) -> InventoryItem {
        InventoryItem {
            id: "item-1".into(),
            name: name.into(),
            category: "Stationery".into(),
            current,
            minimum,
            unit: "pcs".into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn tier_follows_quantities() {
        assert_eq!(item("Markers", 45, 50).tier(), StockTier::Low);
        assert_eq!(item("Markers", 20, 50).tier(), StockTier::Critical);
        assert_eq!(item("Markers", 50, 50).tier(), StockTier::Good);
    }

    #[test]
    fn shortage_saturates() {
        assert_eq!(item("Ink", 8, 15).shortage(), 7);
        assert_eq!(item("Paper", 120, 50).shortage(), 0);
    }

    #[test]
    fn name_match_ignores_case_and_padding() {
        let markers = item("Whiteboard Markers", 1, 1);
        assert!(markers.matches_name("  whiteboard MARKERS "));
        assert!(!markers.matches_name("Whiteboard Marker"));
    }

    #[test]
    fn tier_and_id_are_not_serialized() {
        let body = serde_json::to_value(item("Markers", 45, 50)).unwrap();
        assert!(body.get("id").is_none());
        assert!(body.get("tier").is_none());
        assert!(body.get("updated_at").is_none());
    }

    #[test]
    fn blank_names_fail_validation() {
        assert!(item("   ", 1, 1).validate().is_err());
        assert!(item("Chairs", 1, 1).validate().is_ok());
    }
}
