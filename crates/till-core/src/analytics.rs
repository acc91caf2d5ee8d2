//! # Sales Analytics
//!
//! Reports computed from the transaction history.
//!
//! ## Reports
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sales_by_period     one row per day for the last N days, oldest first, │
//! │                      days without sales included as zero                │
//! │  top_products        revenue per product, best 10                       │
//! │  sales_by_category   revenue and units per known category, zero rows    │
//! │                      dropped                                            │
//! │  total_sales         Σ totals                                           │
//! │  average_order_value total / count                                      │
//! │  dashboard_stats     the numbers on the landing screen                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only completed transactions count. Refunded, pending and cancelled sales
//! are ignored by every report here. Revenue per product uses the price
//! snapshot in the line, before tax and discount.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Category, Product, Transaction};

pub const TOP_PRODUCTS_LIMIT: usize = 10;
pub const RECENT_TRANSACTIONS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailySales {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub revenue_cents: i64,
    pub transactions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TopProduct {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategorySales {
    pub category_id: String,
    pub category: String,
    pub revenue_cents: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardStats {
    pub total_sales_cents: i64,
    pub total_transactions: usize,
    pub average_transaction_cents: i64,
    pub products_count: usize,
    pub low_stock_products: usize,
    pub top_products: Vec<TopProduct>,
    pub recent_transactions: Vec<Transaction>,
}

fn completed(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(|t| t.is_completed())
}

/// Daily revenue for the `days` days ending today, oldest first.
pub fn sales_by_period(
    transactions: &[Transaction],
    days: u32,
    now: DateTime<Utc>,
) -> Vec<DailySales> {
    let today = now.date_naive();
    let mut rows: Vec<DailySales> = (0..days as i64)
        .rev()
        .map(|offset| DailySales {
            date: today - Duration::days(offset),
            revenue_cents: 0,
            transactions: 0,
        })
        .collect();

    let index: HashMap<NaiveDate, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (row.date, i))
        .collect();

    for txn in completed(transactions) {
        if let Some(&i) = index.get(&txn.created_at.date_naive()) {
            rows[i].revenue_cents += txn.total_cents;
            rows[i].transactions += 1;
        }
    }
    rows
}

/// Best-selling products by revenue.
pub fn top_products(transactions: &[Transaction], limit: usize) -> Vec<TopProduct> {
    let mut by_product: HashMap<&str, TopProduct> = HashMap::new();

    for item in completed(transactions).flat_map(|t| &t.items) {
        let entry = by_product
            .entry(item.product_id.as_str())
            .or_insert_with(|| TopProduct {
                product_id: item.product_id.clone(),
                name: item.product.name.clone(),
                quantity: 0,
                revenue_cents: 0,
            });
        entry.quantity += item.quantity;
        entry.revenue_cents += item.line_total().cents();
    }

    let mut ranked: Vec<TopProduct> = by_product.into_values().collect();
    ranked.sort_by(|a, b| {
        b.revenue_cents
            .cmp(&a.revenue_cents)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}

/// Revenue per category, in category order. Lines whose category no longer
/// exists are not counted.
pub fn sales_by_category(transactions: &[Transaction], categories: &[Category]) -> Vec<CategorySales> {
    let mut rows: Vec<CategorySales> = categories
        .iter()
        .map(|c| CategorySales {
            category_id: c.id.clone(),
            category: c.name.clone(),
            revenue_cents: 0,
            count: 0,
        })
        .collect();

    let index: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect();

    for item in completed(transactions).flat_map(|t| &t.items) {
        if let Some(&i) = index.get(item.product.category_id.as_str()) {
            rows[i].revenue_cents += item.line_total().cents();
            rows[i].count += item.quantity;
        }
    }

    rows.retain(|row| row.revenue_cents > 0);
    rows
}

pub fn total_sales(transactions: &[Transaction]) -> Money {
    completed(transactions).map(Transaction::total).sum()
}

/// Zero when there are no sales.
pub fn average_order_value(transactions: &[Transaction]) -> Money {
    let count = completed(transactions).count() as i64;
    if count == 0 {
        return Money::zero();
    }
    let total = total_sales(transactions).cents();
    // nearest cent
    Money::from_cents((total * 2 + count) / (count * 2))
}

pub fn dashboard_stats(transactions: &[Transaction], products: &[Product]) -> DashboardStats {
    let mut recent: Vec<Transaction> = completed(transactions).cloned().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(RECENT_TRANSACTIONS_LIMIT);

    DashboardStats {
        total_sales_cents: total_sales(transactions).cents(),
        total_transactions: completed(transactions).count(),
        average_transaction_cents: average_order_value(transactions).cents(),
        products_count: products.len(),
        low_stock_products: products.iter().filter(|p| p.is_low_stock()).count(),
        top_products: top_products(transactions, TOP_PRODUCTS_LIMIT),
        recent_transactions: recent,
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{product, sale};
    use super::*;
    use crate::types::TransactionStatus;

    #[test]
    fn test_sales_by_period_zero_fills_oldest_first() {
        let now = Utc::now();
        let tea = product("tea", 300, "drinks");
        let txns = vec![
            sale(vec![(tea.clone(), 1)], None, now),
            sale(vec![(tea.clone(), 2)], None, now - Duration::days(2)),
            sale(vec![(tea, 5)], None, now - Duration::days(30)),
        ];

        let rows = sales_by_period(&txns, 7, now);
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[6].date, now.date_naive());
        assert_eq!(rows[6].revenue_cents, 300);
        assert_eq!(rows[4].revenue_cents, 600);
        assert_eq!(rows[5].transactions, 0);
        assert_eq!(rows.iter().map(|r| r.revenue_cents).sum::<i64>(), 900);
    }

    #[test]
    fn test_top_products_by_revenue() {
        let now = Utc::now();
        let tea = product("tea", 300, "drinks");
        let cake = product("cake", 450, "bakery");
        let txns = vec![
            sale(vec![(tea.clone(), 4), (cake.clone(), 1)], None, now),
            sale(vec![(cake, 2)], None, now),
        ];

        let top = top_products(&txns, 10);
        assert_eq!(top[0].name, "cake");
        assert_eq!(top[0].revenue_cents, 1350);
        assert_eq!(top[0].quantity, 3);
        assert_eq!(top[1].revenue_cents, 1200);
        assert_eq!(top_products(&txns, 1).len(), 1);
    }

    #[test]
    fn test_sales_by_category_drops_empty_and_unknown() {
        let now = Utc::now();
        let drinks = Category::new("Drinks", now);
        let snacks = Category::new("Snacks", now);
        let tea = product("tea", 300, &drinks.id);
        let orphan = product("orphan", 999, "deleted-category");

        let txns = vec![sale(vec![(tea, 2), (orphan, 1)], None, now)];
        let rows = sales_by_category(&txns, &[drinks, snacks]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Drinks");
        assert_eq!(rows[0].revenue_cents, 600);
        assert_eq!(rows[0].count, 2);
    }

    #[test]
    fn test_totals_ignore_refunded_sales() {
        let now = Utc::now();
        let tea = product("tea", 300, "drinks");
        let mut refunded = sale(vec![(tea.clone(), 10)], None, now);
        refunded.status = TransactionStatus::Refunded;
        let txns = vec![
            sale(vec![(tea.clone(), 1)], None, now),
            sale(vec![(tea, 2)], None, now),
            refunded,
        ];

        assert_eq!(total_sales(&txns).cents(), 900);
        assert_eq!(average_order_value(&txns).cents(), 450);
        assert!(average_order_value(&[]).is_zero());
    }

    #[test]
    fn test_dashboard_stats() {
        let now = Utc::now();
        let tea = product("tea", 300, "drinks");
        let mut low = product("low", 100, "drinks");
        low.quantity = 1;

        let txns: Vec<Transaction> = (0..7)
            .map(|i| sale(vec![(tea.clone(), 1)], None, now - Duration::minutes(i)))
            .collect();
        let stats = dashboard_stats(&txns, &[tea, low]);

        assert_eq!(stats.total_transactions, 7);
        assert_eq!(stats.total_sales_cents, 2100);
        assert_eq!(stats.average_transaction_cents, 300);
        assert_eq!(stats.products_count, 2);
        assert_eq!(stats.low_stock_products, 1);
        assert_eq!(stats.recent_transactions.len(), RECENT_TRANSACTIONS_LIMIT);
        assert_eq!(stats.recent_transactions[0].created_at, now);
    }
}
