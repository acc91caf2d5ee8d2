//! Returns, the restock records they produce, and refund policies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{new_id, Entity};

/// Restock fee charged when no policy applies.
pub const DEFAULT_RESTOCK_FEE_PERCENT: u32 = 10;

// =============================================================================
// Return
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl ReturnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Pending => "pending",
            ReturnStatus::Approved => "approved",
            ReturnStatus::Rejected => "rejected",
            ReturnStatus::Completed => "completed",
            ReturnStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReturnReason {
    Damaged,
    Defective,
    WrongItem,
    ChangedMind,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RefundMethod {
    Cash,
    Card,
    StoreCredit,
    GiftCard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReturnItem {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub original_price_cents: i64,
    pub reason: ReturnReason,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ReturnItem {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        quantity: i64,
        original_price_cents: i64,
        reason: ReturnReason,
    ) -> Self {
        ReturnItem {
            id: new_id(),
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            original_price_cents,
            reason,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Return {
    pub id: String,
    pub transaction_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub items: Vec<ReturnItem>,
    pub status: ReturnStatus,
    #[serde(default)]
    pub refund_cents: i64,
    pub refund_method: RefundMethod,
    pub store_location_id: String,
    /// Employee id.
    #[serde(default)]
    pub processed_by: Option<String>,
    #[serde(default)]
    pub approval_notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub restock_date: Option<DateTime<Utc>>,
}

impl Return {
    /// A new pending return with no refund decided yet.
    pub fn new(
        transaction_id: impl Into<String>,
        items: Vec<ReturnItem>,
        customer_id: Option<String>,
        store_location_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Return {
            id: new_id(),
            transaction_id: transaction_id.into(),
            customer_id,
            items,
            status: ReturnStatus::Pending,
            refund_cents: 0,
            refund_method: RefundMethod::Cash,
            store_location_id: store_location_id.into(),
            processed_by: None,
            approval_notes: None,
            created_at: now,
            completed_at: None,
            restock_date: None,
        }
    }
}

impl Entity for Return {
    fn id(&self) -> &str {
        &self.id
    }
}

patch_struct! {
    ReturnPatch for Return {
        processed_by: Option<String>,
        approval_notes: Option<String>,
        restock_date: Option<DateTime<Utc>>,
    }
}

// =============================================================================
// Restock Record
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    Sellable,
    Damaged,
    Unsellable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RestockRecord {
    pub id: String,
    pub return_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub condition: ItemCondition,
    #[serde(default)]
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

impl RestockRecord {
    pub fn new(
        return_id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: i64,
        condition: ItemCondition,
        now: DateTime<Utc>,
    ) -> Self {
        RestockRecord {
            id: new_id(),
            return_id: return_id.into(),
            product_id: product_id.into(),
            quantity,
            condition,
            notes: None,
            date: now,
        }
    }
}

impl Entity for RestockRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

patch_struct! {
    RestockRecordPatch for RestockRecord {
        condition: ItemCondition,
        notes: Option<String>,
    }
}

// =============================================================================
// Refund Policy
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PolicyScope {
    All,
    SpecificProducts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RefundPolicy {
    pub id: String,
    pub name: String,
    pub return_window_days: u32,
    pub requires_receipt: bool,
    pub allow_partial_return: bool,
    pub requires_inspection: bool,
    pub applied_to: PolicyScope,
    #[serde(default)]
    pub applicable_product_ids: Vec<String>,
    pub restock_fee_percent: u32,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Entity for RefundPolicy {
    fn id(&self) -> &str {
        &self.id
    }
}

patch_struct! {
    RefundPolicyPatch for RefundPolicy {
        name: String,
        return_window_days: u32,
        requires_receipt: bool,
        allow_partial_return: bool,
        requires_inspection: bool,
        applied_to: PolicyScope,
        applicable_product_ids: Vec<String>,
        restock_fee_percent: u32,
        is_active: bool,
    }
}
