use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{new_id, Entity};

/// Why a stock quantity changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InventoryLogType {
    Sale,
    Purchase,
    Adjustment,
    Return,
}

/// Append-only record of one stock movement.
///
/// `quantity` is the size of the movement as entered, not the signed delta:
/// the log type tells which direction it went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryLog {
    pub id: String,
    pub product_id: String,
    #[serde(rename = "type")]
    pub log_type: InventoryLogType,
    pub quantity: i64,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl InventoryLog {
    pub fn new(
        product_id: impl Into<String>,
        log_type: InventoryLogType,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Self {
        InventoryLog {
            id: new_id(),
            product_id: product_id.into(),
            log_type,
            quantity,
            reference: None,
            notes: None,
            created_at: now,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Entity for InventoryLog {
    fn id(&self) -> &str {
        &self.id
    }
}

patch_struct! {
    InventoryLogPatch for InventoryLog {
        reference: Option<String>,
        notes: Option<String>,
    }
}
