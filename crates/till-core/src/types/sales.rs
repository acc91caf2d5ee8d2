//! Cart lines and completed sales.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{Entity, Product};
use crate::money::Money;

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the cart.
///
/// Carries a snapshot of the product as it was when added, so later edits to
/// the catalog do not change the price of a sale already in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    pub product_id: String,
    pub product: Product,
    pub quantity: i64,
    /// Per-line discount in cents.
    #[serde(default)]
    pub discount_cents: Option<i64>,
}

impl CartItem {
    pub fn new(product: Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            product,
            quantity,
            discount_cents: None,
        }
    }

    /// Price × quantity, before any discount.
    pub fn line_total(&self) -> Money {
        self.product.price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Check,
    Digital,
}

impl PaymentMethod {
    /// Methods where the cashier enters the amount handed over.
    pub fn requires_tender(&self) -> bool {
        matches!(self, PaymentMethod::Cash | PaymentMethod::Digital)
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Refunded,
    Cancelled,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Completed
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A sale record with line items and computed totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    /// Human-facing number, `TXN<unix millis>`.
    pub transaction_number: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub items: Vec<CartItem>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    #[serde(default)]
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }

    /// Units sold across every line.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Formats the transaction number for a sale recorded at `now`.
pub fn transaction_number(now: DateTime<Utc>) -> String {
    format!("TXN{}", now.timestamp_millis())
}

impl Entity for Transaction {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

patch_struct! {
    TransactionPatch for Transaction {
        customer_id: Option<String>,
        status: TransactionStatus,
        notes: Option<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_transaction_number_uses_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(transaction_number(now), "TXN1700000000123");
    }

    #[test]
    fn test_line_total() {
        let mut product = Product::new("Chips", "CHIPS-1", 250, Utc::now());
        product.quantity = 10;
        let item = CartItem::new(product, 3);
        assert_eq!(item.line_total().cents(), 750);
    }

    #[test]
    fn test_payment_method_wire_names() {
        let json = serde_json::to_string(&PaymentMethod::Digital).unwrap();
        assert_eq!(json, "\"digital\"");
        assert!(PaymentMethod::Cash.requires_tender());
        assert!(!PaymentMethod::Card.requires_tender());
    }
}
