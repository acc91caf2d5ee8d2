//! Dashboard and reports over the current snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;

use till_core::analytics::{self, CategorySales, DailySales, DashboardStats, TopProduct, TOP_PRODUCTS_LIMIT};
use till_core::customer_analytics::{
    self, CustomerRanking, CustomerSegments, CustomerSummary, AT_RISK_DAYS, NEW_CUSTOMER_DAYS,
};
use till_core::loyalty::TOP_CUSTOMERS_LIMIT;
use till_core::Customer;
use till_db::Database;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub daily: Vec<DailySales>,
    pub top_products: Vec<TopProduct>,
    pub by_category: Vec<CategorySales>,
    pub total_sales_cents: i64,
    pub average_order_value_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReport {
    pub top_customers: Vec<CustomerRanking>,
    pub segments: CustomerSegments,
    pub at_risk: Vec<Customer>,
    pub new_customers: Vec<Customer>,
}

pub fn dashboard(db: &Database) -> DashboardStats {
    analytics::dashboard_stats(&db.transactions().list(), &db.products().list())
}

/// Sales over the last `days` days.
pub fn sales_report(db: &Database, days: u32, now: DateTime<Utc>) -> SalesReport {
    let transactions = db.transactions().list();
    SalesReport {
        daily: analytics::sales_by_period(&transactions, days, now),
        top_products: analytics::top_products(&transactions, TOP_PRODUCTS_LIMIT),
        by_category: analytics::sales_by_category(&transactions, &db.categories().list()),
        total_sales_cents: analytics::total_sales(&transactions).cents(),
        average_order_value_cents: analytics::average_order_value(&transactions).cents(),
    }
}

pub fn customer_report(db: &Database, now: DateTime<Utc>) -> CustomerReport {
    let customers = db.customers().list();
    let transactions = db.transactions().list();
    CustomerReport {
        top_customers: customer_analytics::top_customers(&customers, &transactions, TOP_CUSTOMERS_LIMIT),
        segments: customer_analytics::customer_segments(&customers, &transactions, now),
        at_risk: customer_analytics::at_risk_customers(&customers, &transactions, AT_RISK_DAYS, now)
            .into_iter()
            .cloned()
            .collect(),
        new_customers: customer_analytics::new_customers(&customers, NEW_CUSTOMER_DAYS, now)
            .into_iter()
            .cloned()
            .collect(),
    }
}

pub fn customer_summary(
    db: &Database,
    customer_id: &str,
    now: DateTime<Utc>,
) -> Result<CustomerSummary, ApiError> {
    let customer = db.customers().require(customer_id)?;
    Ok(customer_analytics::customer_summary(
        &customer,
        &db.transactions().list(),
        now,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_db::DbConfig;

    #[tokio::test]
    async fn test_empty_reports() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        let stats = dashboard(&db);
        assert_eq!(stats.total_transactions, 0);
        assert_eq!(stats.average_transaction_cents, 0);

        let report = sales_report(&db, 7, now);
        assert_eq!(report.daily.len(), 7);
        assert!(report.daily.iter().all(|d| d.revenue_cents == 0));
        assert!(report.by_category.is_empty());

        let customers = customer_report(&db, now);
        assert!(customers.top_customers.is_empty());
        assert_eq!(customers.segments, CustomerSegments::default());
    }

    #[tokio::test]
    async fn test_summary_for_unknown_customer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(customer_summary(&db, "nobody", Utc::now()).is_err());
    }
}
