//! Inventory item record and its document encoding.
//!
//! # Responsibility
//! - Define the canonical `InventoryItem` shape shared by repo and view code.
//! - Translate between items and `inventory` collection documents.
//!
//! # Invariants
//! - Decoding requires an integer `quantity` field; nothing else is validated.
//! - A missing or null `timestamp` decodes as epoch zero.

use crate::store::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Document collection holding inventory records.
pub const INVENTORY_COLLECTION: &str = "inventory";

const QUANTITY_FIELD: &str = "quantity";
const TIMESTAMP_FIELD: &str = "timestamp";

/// One named stock line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique name, used as the document key.
    pub name: String,
    /// Units on hand. Never zero for a stored record.
    pub quantity: i64,
    /// Unix epoch milliseconds of the last increment.
    pub last_modified: i64,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, quantity: i64, last_modified: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            last_modified,
        }
    }

    /// Name with its first character upper-cased, for list rendering.
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Decodes a stored document body keyed by `name`.
    pub fn from_document(name: &str, data: &Document) -> Result<Self, ItemDecodeError> {
        let quantity = match data.get(QUANTITY_FIELD) {
            Some(value) => value.as_i64().ok_or_else(|| ItemDecodeError {
                name: name.to_string(),
                reason: format!("`{QUANTITY_FIELD}` is not an integer: {value}"),
            })?,
            None => {
                return Err(ItemDecodeError {
                    name: name.to_string(),
                    reason: format!("missing `{QUANTITY_FIELD}` field"),
                })
            }
        };

        let last_modified = match data.get(TIMESTAMP_FIELD) {
            None | Some(Value::Null) => 0,
            Some(value) => value.as_i64().ok_or_else(|| ItemDecodeError {
                name: name.to_string(),
                reason: format!("`{TIMESTAMP_FIELD}` is not an epoch-millisecond integer: {value}"),
            })?,
        };

        Ok(Self {
            name: name.to_string(),
            quantity,
            last_modified,
        })
    }

    /// Encodes the stored fields. The name travels as the document key.
    pub fn to_document(&self) -> Document {
        let mut data = Document::new();
        data.insert(QUANTITY_FIELD.to_string(), Value::from(self.quantity));
        data.insert(TIMESTAMP_FIELD.to_string(), Value::from(self.last_modified));
        data
    }
}

/// Stored document does not describe a valid item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDecodeError {
    pub name: String,
    pub reason: String,
}

impl Display for ItemDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "item `{}`: {}", self.name, self.reason)
    }
}

impl Error for ItemDecodeError {}
