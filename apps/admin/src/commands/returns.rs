//! # Return Commands
//!
//! Approval prices the refund; completion pays it out and puts sellable
//! units back on the shelf.
//!
//! ```text
//! create_return ──► record_inspection* ──► approve_return ──► complete_return
//!   (pending)        (restock records)     (refund priced)    (stock += sellable,
//!                                                              `return` logs,
//!                                                              restock_date set)
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use till_core::{
    inventory, InventoryLog, ItemCondition, RefundMethod, RestockRecord, Return, ReturnPatch,
};
use till_db::Database;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedReturn {
    #[serde(rename = "return")]
    pub ret: Return,
    /// One `return` log per product put back in stock.
    pub restocked: Vec<InventoryLog>,
}

/// Records how a returned product came back. Only sellable units are
/// restocked when the return completes.
///
/// The product must be on the return, and all inspections of it together
/// may not cover more units than were returned.
pub async fn record_inspection(
    db: &Database,
    return_id: &str,
    product_id: &str,
    quantity: i64,
    condition: ItemCondition,
    now: DateTime<Utc>,
) -> Result<RestockRecord, ApiError> {
    Ok(db
        .returns()
        .add_restock_record(return_id, product_id, quantity, condition, now)
        .await?)
}

/// Approves a pending return, pricing the refund under `policy_id` (the
/// default restock fee when `None`).
pub async fn approve_return(
    db: &Database,
    return_id: &str,
    policy_id: Option<&str>,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> Result<Return, ApiError> {
    let ret = db.returns().returns().require(return_id)?;
    let refund = db.returns().calculate_refund(&ret.items, policy_id);
    Ok(db.returns().approve(return_id, refund, notes, now).await?)
}

/// Completes an approved return and restocks its sellable units.
pub async fn complete_return(
    db: &Database,
    return_id: &str,
    method: RefundMethod,
    now: DateTime<Utc>,
) -> Result<CompletedReturn, ApiError> {
    let ret = db.returns().complete(return_id, method, now).await?;

    let sellable = db.returns().sellable_restock(return_id);
    if sellable.is_empty() {
        return Ok(CompletedReturn {
            ret,
            restocked: Vec::new(),
        });
    }

    let logs = db
        .products()
        .modify(|products| {
            let mut logs = Vec::with_capacity(sellable.len());
            for (product_id, quantity) in &sellable {
                match products.iter_mut().find(|p| &p.id == product_id) {
                    Some(product) => {
                        logs.push(inventory::restock_return(product, *quantity, return_id, now))
                    }
                    None => warn!(product = %product_id, "Returned product no longer in catalog"),
                }
            }
            Ok(logs)
        })
        .await?;
    db.inventory_logs().append(logs.clone()).await?;

    let ret = db
        .returns()
        .returns()
        .update(
            return_id,
            ReturnPatch {
                restock_date: Some(Some(now)),
                ..Default::default()
            },
        )
        .await?;

    info!(return_id = %ret.id, products = logs.len(), "Returned stock put back");
    Ok(CompletedReturn {
        ret,
        restocked: logs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use till_core::{Product, ReturnItem, ReturnReason, ReturnStatus};
    use till_db::DbConfig;

    #[tokio::test]
    async fn test_complete_requires_approval() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut mug = Product::new("Mug", "MUG-1", 1000, Utc::now());
        mug.quantity = 1;
        let mug = db.products().add(mug).await.unwrap();

        let item = ReturnItem::new(&mug.id, "Mug", 1, 1000, ReturnReason::ChangedMind);
        let ret = db
            .returns()
            .create_return("txn-1", vec![item], None, None, Utc::now())
            .await
            .unwrap();
        record_inspection(&db, &ret.id, &mug.id, 1, ItemCondition::Sellable, Utc::now())
            .await
            .unwrap();

        let err = complete_return(&db, &ret.id, RefundMethod::Cash, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(db.products().require(&mug.id).unwrap().quantity, 1);
        assert_eq!(
            db.returns().returns().require(&ret.id).unwrap().status,
            ReturnStatus::Pending
        );
    }

    async fn return_of_one_mug(db: &Database) -> (Product, Return) {
        let mut mug = Product::new("Mug", "MUG-1", 1000, Utc::now());
        mug.quantity = 2;
        let mug = db.products().add(mug).await.unwrap();
        let item = ReturnItem::new(&mug.id, "Mug", 1, 1000, ReturnReason::ChangedMind);
        let ret = db
            .returns()
            .create_return("txn-1", vec![item], None, None, Utc::now())
            .await
            .unwrap();
        (mug, ret)
    }

    #[tokio::test]
    async fn test_negative_inspection_cannot_lower_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (mug, ret) = return_of_one_mug(&db).await;
        let now = Utc::now();

        for qty in [-10, 0] {
            let err = record_inspection(&db, &ret.id, &mug.id, qty, ItemCondition::Sellable, now)
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError);
        }
        assert!(db.returns().restock_records().is_empty());

        approve_return(&db, &ret.id, None, None, now).await.unwrap();
        let done = complete_return(&db, &ret.id, RefundMethod::Cash, now).await.unwrap();
        assert!(done.restocked.is_empty());
        assert_eq!(db.products().require(&mug.id).unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_inspection_cannot_exceed_returned_units() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (mug, ret) = return_of_one_mug(&db).await;
        let now = Utc::now();

        let err = record_inspection(&db, &ret.id, &mug.id, 5, ItemCondition::Sellable, now)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        record_inspection(&db, &ret.id, &mug.id, 1, ItemCondition::Sellable, now)
            .await
            .unwrap();
        let err = record_inspection(&db, &ret.id, &mug.id, 1, ItemCondition::Sellable, now)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(db.returns().restock_records().len(), 1);
    }

    #[tokio::test]
    async fn test_inspection_of_product_not_returned() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (_, ret) = return_of_one_mug(&db).await;
        let bowl = db
            .products()
            .add(Product::new("Bowl", "BOWL-1", 800, Utc::now()))
            .await
            .unwrap();

        let err = record_inspection(&db, &ret.id, &bowl.id, 1, ItemCondition::Sellable, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(db.returns().restock_records().is_empty());
    }

    #[tokio::test]
    async fn test_inspection_needs_a_known_return() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = record_inspection(&db, "ret-x", "p-1", 1, ItemCondition::Damaged, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
