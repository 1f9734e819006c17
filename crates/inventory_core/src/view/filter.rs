//! Text filter and sort controls.
//!
//! # Invariants
//! - [`apply`] is pure: same inputs, same output, input slice untouched.
//! - Sorting is stable; ties keep snapshot order.
//! - When both sort controls are active, quantity is the primary key and
//!   `last_modified` breaks ties.

use crate::model::item::InventoryItem;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Ordering by `last_modified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    #[default]
    Unsorted,
    MostRecentFirst,
    OldestFirst,
}

/// Ordering by `quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityOrder {
    #[default]
    Unsorted,
    HighestFirst,
    LowestFirst,
}

impl DateOrder {
    /// Selector label (`latest|oldest|none`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Unsorted => "none",
            Self::MostRecentFirst => "latest",
            Self::OldestFirst => "oldest",
        }
    }

    fn compare(self, a: &InventoryItem, b: &InventoryItem) -> Ordering {
        match self {
            Self::Unsorted => Ordering::Equal,
            Self::MostRecentFirst => b.last_modified.cmp(&a.last_modified),
            Self::OldestFirst => a.last_modified.cmp(&b.last_modified),
        }
    }
}

impl QuantityOrder {
    /// Selector label (`most|least|all`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Unsorted => "all",
            Self::HighestFirst => "most",
            Self::LowestFirst => "least",
        }
    }

    fn compare(self, a: &InventoryItem, b: &InventoryItem) -> Ordering {
        match self {
            Self::Unsorted => Ordering::Equal,
            Self::HighestFirst => b.quantity.cmp(&a.quantity),
            Self::LowestFirst => a.quantity.cmp(&b.quantity),
        }
    }
}

/// Unknown sort control label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlParseError {
    pub control: &'static str,
    pub value: String,
}

impl Display for ControlParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let expected = match self.control {
            "date" => "latest|oldest|none",
            _ => "most|least|all",
        };
        write!(
            f,
            "unsupported {} order `{}`; expected {expected}",
            self.control, self.value
        )
    }
}

impl Error for ControlParseError {}

impl FromStr for DateOrder {
    type Err = ControlParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::Unsorted),
            "latest" | "recent" | "most_recent_first" => Ok(Self::MostRecentFirst),
            "oldest" | "previous" | "oldest_first" => Ok(Self::OldestFirst),
            other => Err(ControlParseError {
                control: "date",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for QuantityOrder {
    type Err = ControlParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" | "none" => Ok(Self::Unsorted),
            "most" | "highest" | "highest_first" => Ok(Self::HighestFirst),
            "least" | "lowest" | "lowest_first" => Ok(Self::LowestFirst),
            other => Err(ControlParseError {
                control: "quantity",
                value: other.to_string(),
            }),
        }
    }
}

/// The three list controls, owned by whoever renders the list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewControls {
    pub search: String,
    pub date_order: DateOrder,
    pub quantity_order: QuantityOrder,
}

impl ViewControls {
    /// Controls a fresh list view starts with: newest first, any quantity.
    pub fn startup() -> Self {
        Self {
            search: String::new(),
            date_order: DateOrder::MostRecentFirst,
            quantity_order: QuantityOrder::Unsorted,
        }
    }

    pub fn apply(&self, snapshot: &[InventoryItem]) -> Vec<InventoryItem> {
        apply(
            snapshot,
            &self.search,
            self.date_order,
            self.quantity_order,
        )
    }
}

/// Filters `snapshot` by case-insensitive name substring, then sorts it.
pub fn apply(
    snapshot: &[InventoryItem],
    text_filter: &str,
    date_order: DateOrder,
    quantity_order: QuantityOrder,
) -> Vec<InventoryItem> {
    let needle = text_filter.to_lowercase();
    let mut items = snapshot
        .iter()
        .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
        .cloned()
        .collect::<Vec<_>>();

    if date_order != DateOrder::Unsorted || quantity_order != QuantityOrder::Unsorted {
        items.sort_by(|a, b| {
            quantity_order
                .compare(a, b)
                .then_with(|| date_order.compare(a, b))
        });
    }

    items
}
