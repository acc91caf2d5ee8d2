//! Product and customer CSV exchange.
//!
//! Imports append to what is already stored; nothing is merged or
//! de-duplicated. A file that fails to parse imports nothing.

use chrono::{DateTime, Utc};
use tracing::info;

use till_core::csv;
use till_db::Database;

use crate::error::ApiError;

pub fn export_products(db: &Database) -> String {
    csv::export_products(&db.products().list())
}

/// Returns how many products were added.
pub async fn import_products(
    db: &Database,
    text: &str,
    now: DateTime<Utc>,
) -> Result<usize, ApiError> {
    let products = csv::import_products(text, now)?;
    let count = db.products().append(products).await?;
    info!(count, "Products imported");
    Ok(count)
}

pub fn export_customers(db: &Database) -> String {
    csv::export_customers(&db.customers().list())
}

/// Returns how many customers were added.
pub async fn import_customers(
    db: &Database,
    text: &str,
    now: DateTime<Utc>,
) -> Result<usize, ApiError> {
    let customers = csv::import_customers(text, now)?;
    let count = db.customers().append(customers).await?;
    info!(count, "Customers imported");
    Ok(count)
}
