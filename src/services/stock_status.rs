//! Stock severity classification.
//!
//! The tier of an item is a pure function of its current quantity and its
//! minimum threshold:
//!
//! * `critical` when `current <= minimum / 2`
//! * `low` when `minimum / 2 < current < minimum`
//! * `good` when `current >= minimum`
//!
//! The critical test runs first, so `(0, 0)` is critical while any positive
//! quantity against a zero minimum is good. Negative inputs are clamped to
//! zero.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Severity tiers, ordered from most to least severe.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StockTier {
    Critical,
    Low,
    Good,
}

impl StockTier {
    pub fn needs_restock(self) -> bool {
        self != StockTier::Good
    }
}

pub fn classify(current: i64, minimum: i64) -> StockTier {
    let current = i128::from(current.max(0));
    let minimum = i128::from(minimum.max(0));

    // current <= minimum * 0.5 without leaving integer arithmetic
    if current * 2 <= minimum {
        StockTier::Critical
    } else if current < minimum {
        StockTier::Low
    } else {
        StockTier::Good
    }
}
