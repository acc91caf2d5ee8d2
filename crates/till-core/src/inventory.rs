//! # Inventory
//!
//! Stock movements, reorder suggestions and stock valuation.
//!
//! ## Movements and Their Logs
//! ```text
//! ┌──────────────────────┬────────────────┬─────────────────┬──────────────┐
//! │  Movement            │  Quantity      │  Log type       │  Floor at 0  │
//! ├──────────────────────┼────────────────┼─────────────────┼──────────────┤
//! │  adjust_stock(Add)   │  + qty         │  purchase       │  n/a         │
//! │  adjust_stock(Remove)│  − qty         │  adjustment     │  yes         │
//! │  record_sale         │  − qty         │  sale           │  no          │
//! │  restock_return      │  + qty         │  return         │  n/a         │
//! └──────────────────────┴────────────────┴─────────────────┴──────────────┘
//! ```
//!
//! Sales are recorded even when they drive the quantity negative: the goods
//! have already left the shop.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{InventoryLog, InventoryLogType, Product};
use crate::validation::{validate_bounded, MAX_STOCK_MOVEMENT};

/// Category label for products without one.
pub const UNCATEGORIZED: &str = "Other";

// =============================================================================
// Stock Movements
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockAdjustment {
    Add,
    Remove,
}

/// Manual stock adjustment.
///
/// Refuses quantities outside `1..=MAX_STOCK_MOVEMENT` and any removal that
/// would leave the product below zero; in both cases `product` is left
/// unchanged.
pub fn adjust_stock(
    product: &mut Product,
    adjustment: StockAdjustment,
    quantity: i64,
    reference: Option<String>,
    now: DateTime<Utc>,
) -> CoreResult<InventoryLog> {
    validate_bounded("quantity", quantity, MAX_STOCK_MOVEMENT)?;

    let insufficient = || CoreError::InsufficientStock {
        sku: product.sku.clone(),
        available: product.quantity,
        requested: quantity,
    };

    let (new_quantity, log_type, notes) = match adjustment {
        StockAdjustment::Add => (
            product
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| ValidationError::OutOfRange {
                    field: "quantity".to_string(),
                    min: 0,
                    max: i64::MAX,
                })?,
            InventoryLogType::Purchase,
            "Stock added",
        ),
        StockAdjustment::Remove => (
            product.quantity.checked_sub(quantity).ok_or_else(insufficient)?,
            InventoryLogType::Adjustment,
            "Stock removed",
        ),
    };

    if new_quantity < 0 {
        return Err(insufficient());
    }

    product.quantity = new_quantity;
    product.updated_at = now;

    let mut log = InventoryLog::new(&product.id, log_type, quantity, now).with_notes(notes);
    log.reference = reference.filter(|r| !r.trim().is_empty());
    Ok(log)
}

/// Takes sold units off the shelf. Never fails.
pub fn record_sale(
    product: &mut Product,
    quantity: i64,
    transaction_number: &str,
    now: DateTime<Utc>,
) -> InventoryLog {
    product.quantity = product.quantity.saturating_sub(quantity);
    product.updated_at = now;
    InventoryLog::new(&product.id, InventoryLogType::Sale, quantity, now)
        .with_reference(transaction_number)
}

/// Puts returned sellable units back on the shelf.
pub fn restock_return(
    product: &mut Product,
    quantity: i64,
    return_id: &str,
    now: DateTime<Utc>,
) -> InventoryLog {
    product.quantity = product.quantity.saturating_add(quantity);
    product.updated_at = now;
    InventoryLog::new(&product.id, InventoryLogType::Return, quantity, now)
        .with_reference(return_id)
        .with_notes("Returned to stock")
}

// =============================================================================
// Reorder Suggestions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReorderSuggestion {
    pub product_id: String,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub suggested_order: i64,
    pub supplier_id: Option<String>,
}

/// Active low-stock products, emptiest first.
///
/// The suggested order is the product's `reorder_quantity` when set,
/// otherwise enough to reach twice the reorder threshold.
pub fn reorder_suggestions(products: &[Product]) -> Vec<ReorderSuggestion> {
    let mut suggestions: Vec<ReorderSuggestion> = products
        .iter()
        .filter(|p| p.active && p.is_low_stock())
        .map(|p| ReorderSuggestion {
            product_id: p.id.clone(),
            name: p.name.clone(),
            sku: p.sku.clone(),
            quantity: p.quantity,
            min_quantity: p.min_quantity,
            suggested_order: p
                .reorder_quantity
                .unwrap_or(2 * p.min_quantity - p.quantity)
                .max(1),
            supplier_id: p.supplier_id.clone(),
        })
        .collect();
    suggestions.sort_by_key(|s| s.quantity);
    suggestions
}

// =============================================================================
// Stock Valuation
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductValuation {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub cost_per_unit_cents: i64,
    pub total_value_cents: i64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockValuation {
    pub total_value_cents: i64,
    pub by_category: BTreeMap<String, i64>,
    /// Highest value first.
    pub by_product: Vec<ProductValuation>,
    pub average_cost_per_item_cents: i64,
    pub item_count: i64,
}

/// Cost value of everything in stock. Products at zero or below are left
/// out.
pub fn stock_valuation(products: &[Product]) -> StockValuation {
    let mut by_product: Vec<ProductValuation> = products
        .iter()
        .filter(|p| p.quantity > 0)
        .map(|p| ProductValuation {
            id: p.id.clone(),
            name: p.name.clone(),
            quantity: p.quantity,
            cost_per_unit_cents: p.cost_cents,
            total_value_cents: p.stock_value().cents(),
            category: if p.category_id.is_empty() {
                UNCATEGORIZED.to_string()
            } else {
                p.category_id.clone()
            },
        })
        .collect();

    let total_value: i64 = by_product.iter().map(|p| p.total_value_cents).sum();
    let item_count: i64 = by_product.iter().map(|p| p.quantity).sum();

    let mut by_category = BTreeMap::new();
    for p in &by_product {
        *by_category.entry(p.category.clone()).or_insert(0) += p.total_value_cents;
    }

    by_product.sort_by(|a, b| b.total_value_cents.cmp(&a.total_value_cents));

    let average = if item_count > 0 {
        (total_value as f64 / item_count as f64).round() as i64
    } else {
        0
    };

    StockValuation {
        total_value_cents: total_value,
        by_category,
        by_product,
        average_cost_per_item_cents: average,
        item_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(sku: &str, quantity: i64) -> Product {
        let mut p = Product::new(sku, sku, 500, Utc::now());
        p.quantity = quantity;
        p
    }

    #[test]
    fn test_add_stock_logs_purchase() {
        let mut p = product("COLA", 3);
        let log = adjust_stock(&mut p, StockAdjustment::Add, 7, Some("PO-12".into()), Utc::now())
            .unwrap();

        assert_eq!(p.quantity, 10);
        assert_eq!(log.log_type, InventoryLogType::Purchase);
        assert_eq!(log.quantity, 7);
        assert_eq!(log.reference.as_deref(), Some("PO-12"));
        assert_eq!(log.notes.as_deref(), Some("Stock added"));
    }

    #[test]
    fn test_remove_below_zero_is_rejected() {
        let mut p = product("COLA", 3);
        let err = adjust_stock(&mut p, StockAdjustment::Remove, 4, None, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 3,
                requested: 4,
                ..
            }
        ));
        assert_eq!(p.quantity, 3);

        let log = adjust_stock(&mut p, StockAdjustment::Remove, 3, Some(" ".into()), Utc::now())
            .unwrap();
        assert_eq!(p.quantity, 0);
        assert_eq!(log.log_type, InventoryLogType::Adjustment);
        assert_eq!(log.reference, None);
    }

    #[test]
    fn test_non_positive_quantity_is_rejected() {
        let mut p = product("COLA", 3);
        assert!(adjust_stock(&mut p, StockAdjustment::Add, 0, None, Utc::now()).is_err());
        assert!(adjust_stock(&mut p, StockAdjustment::Remove, -2, None, Utc::now()).is_err());
        assert_eq!(p.quantity, 3);
    }

    #[test]
    fn test_adjustment_is_capped() {
        let mut p = product("COLA", 5);
        assert!(adjust_stock(&mut p, StockAdjustment::Add, MAX_STOCK_MOVEMENT, None, Utc::now()).is_ok());
        assert_eq!(p.quantity, 5 + MAX_STOCK_MOVEMENT);

        let err = adjust_stock(&mut p, StockAdjustment::Add, i64::MAX, None, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { max: MAX_STOCK_MOVEMENT, .. })
        ));
        assert_eq!(p.quantity, 5 + MAX_STOCK_MOVEMENT);

        // imported quantities are not bounded; the sum still must not wrap
        p.quantity = i64::MAX - 1;
        let err = adjust_stock(&mut p, StockAdjustment::Add, 2, None, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::OutOfRange { .. })));
        assert_eq!(p.quantity, i64::MAX - 1);
    }

    #[test]
    fn test_sale_may_go_negative() {
        let mut p = product("COLA", 1);
        let log = record_sale(&mut p, 3, "TXN1", Utc::now());
        assert_eq!(p.quantity, -2);
        assert_eq!(log.log_type, InventoryLogType::Sale);
        assert_eq!(log.reference.as_deref(), Some("TXN1"));
    }

    #[test]
    fn test_reorder_suggestions() {
        let mut low = product("LOW", 2);
        low.min_quantity = 5;
        let mut preset = product("PRESET", 0);
        preset.reorder_quantity = Some(24);
        let plenty = product("PLENTY", 50);

        let suggestions = reorder_suggestions(&[low, preset, plenty]);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].sku, "PRESET");
        assert_eq!(suggestions[0].suggested_order, 24);
        assert_eq!(suggestions[1].suggested_order, 8);
    }

    #[test]
    fn test_stock_valuation() {
        let mut a = product("A", 10);
        a.cost_cents = 100;
        a.category_id = "drinks".into();
        let mut b = product("B", 2);
        b.cost_cents = 1000;
        let mut gone = product("GONE", 0);
        gone.cost_cents = 9999;

        let valuation = stock_valuation(&[a, b, gone]);
        assert_eq!(valuation.total_value_cents, 3000);
        assert_eq!(valuation.item_count, 12);
        assert_eq!(valuation.average_cost_per_item_cents, 250);
        assert_eq!(valuation.by_product[0].name, "B");
        assert_eq!(valuation.by_category["drinks"], 1000);
        assert_eq!(valuation.by_category[UNCATEGORIZED], 2000);
    }
}
