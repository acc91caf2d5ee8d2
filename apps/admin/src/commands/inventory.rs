//! Stock adjustment and inventory reports.

use chrono::{DateTime, Utc};
use tracing::info;

use till_core::inventory::{self, ReorderSuggestion, StockAdjustment, StockValuation};
use till_core::{InventoryLog, Product};
use till_db::Database;

use crate::error::ApiError;

/// Adds or removes stock by hand.
///
/// The product and its inventory log are written one after the other; a
/// refused adjustment writes neither.
pub async fn adjust_stock(
    db: &Database,
    product_id: &str,
    adjustment: StockAdjustment,
    quantity: i64,
    reference: Option<String>,
    now: DateTime<Utc>,
) -> Result<(Product, InventoryLog), ApiError> {
    let (product, log) = db
        .products()
        .update_with(product_id, |product| {
            Ok(inventory::adjust_stock(product, adjustment, quantity, reference, now)?)
        })
        .await?;
    let log = db.inventory_logs().add(log).await?;

    info!(
        product = %product.sku,
        adjustment = ?adjustment,
        quantity,
        on_hand = product.quantity,
        "Stock adjusted"
    );
    Ok((product, log))
}

pub fn reorder_suggestions(db: &Database) -> Vec<ReorderSuggestion> {
    inventory::reorder_suggestions(&db.products().list())
}

pub fn stock_valuation(db: &Database) -> StockValuation {
    inventory::stock_valuation(&db.products().list())
}

/// Inventory movements for one product, newest first.
pub fn inventory_history(db: &Database, product_id: &str) -> Vec<InventoryLog> {
    let mut logs = db.inventory_logs().for_product(product_id);
    logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    logs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use till_core::InventoryLogType;
    use till_db::DbConfig;

    async fn db_with_stock(quantity: i64) -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut beans = Product::new("Beans", "BEA-1", 450, Utc::now());
        beans.quantity = quantity;
        let beans = db.products().add(beans).await.unwrap();
        (db, beans)
    }

    #[tokio::test]
    async fn test_add_and_remove_stock() {
        let (db, beans) = db_with_stock(5).await;
        let now = Utc::now();

        let (after, log) = adjust_stock(&db, &beans.id, StockAdjustment::Add, 10, Some("PO-7".into()), now)
            .await
            .unwrap();
        assert_eq!(after.quantity, 15);
        assert_eq!(log.log_type, InventoryLogType::Purchase);
        assert_eq!(log.reference.as_deref(), Some("PO-7"));

        let (after, log) = adjust_stock(&db, &beans.id, StockAdjustment::Remove, 15, None, now)
            .await
            .unwrap();
        assert_eq!(after.quantity, 0);
        assert_eq!(log.log_type, InventoryLogType::Adjustment);
        assert_eq!(inventory_history(&db, &beans.id).len(), 2);
    }

    #[tokio::test]
    async fn test_overdraw_writes_nothing() {
        let (db, beans) = db_with_stock(3).await;

        let err = adjust_stock(&db, &beans.id, StockAdjustment::Remove, 4, None, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(db.products().require(&beans.id).unwrap().quantity, 3);
        assert!(db.inventory_logs().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_quantity_is_a_validation_error() {
        let (db, beans) = db_with_stock(3).await;
        let err = adjust_stock(&db, &beans.id, StockAdjustment::Add, 0, None, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_huge_add_is_a_validation_error() {
        let (db, beans) = db_with_stock(5).await;
        let err = adjust_stock(&db, &beans.id, StockAdjustment::Add, i64::MAX, None, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(db.products().require(&beans.id).unwrap().quantity, 5);
        assert!(db.inventory_logs().is_empty());
    }

    #[tokio::test]
    async fn test_reports_read_current_catalog() {
        let (db, beans) = db_with_stock(2).await;
        let suggestions = reorder_suggestions(&db);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].product_id, beans.id);
        assert_eq!(stock_valuation(&db).item_count, 2);
    }
}
