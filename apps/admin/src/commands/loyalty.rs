//! Loyalty points and rewards.

use serde::Serialize;
use tracing::info;

use till_core::loyalty::{self, PointsAction, RewardTier, REWARD_TIERS, TOP_CUSTOMERS_LIMIT};
use till_core::Customer;
use till_db::{Database, DbError};

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyOverview {
    /// Points holders, highest balance first.
    pub top_customers: Vec<Customer>,
    pub tiers: Vec<RewardTier>,
    pub points_outstanding: i64,
}

/// Adds or redeems points. Redeeming more than the balance leaves zero;
/// a rejected change leaves the customer untouched.
pub async fn manage_points(
    db: &Database,
    customer_id: &str,
    action: PointsAction,
    points: i64,
) -> Result<Customer, ApiError> {
    let (customer, before) = db
        .customers()
        .update_with(customer_id, |customer| {
            let before = customer.loyalty_points;
            customer.loyalty_points =
                loyalty::apply_points(before, action, points).map_err(DbError::from)?;
            Ok(before)
        })
        .await?;

    info!(
        customer = %customer.id,
        action = ?action,
        from = before,
        to = customer.loyalty_points,
        "Loyalty points changed"
    );
    Ok(customer)
}

pub fn loyalty_overview(db: &Database) -> LoyaltyOverview {
    let customers = db.customers().list();
    LoyaltyOverview {
        top_customers: loyalty::top_customers(&customers, TOP_CUSTOMERS_LIMIT)
            .into_iter()
            .cloned()
            .collect(),
        tiers: REWARD_TIERS.to_vec(),
        points_outstanding: customers.iter().map(|c| c.loyalty_points).sum(),
    }
}

/// The best reward a customer can claim right now.
pub fn available_reward(db: &Database, customer_id: &str) -> Result<Option<RewardTier>, ApiError> {
    let customer = db.customers().require(customer_id)?;
    Ok(loyalty::best_tier(customer.loyalty_points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use till_core::validation::MAX_POINTS_CHANGE;
    use till_db::DbConfig;

    async fn db_with_customer(points: i64) -> (Database, Customer) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut ada = Customer::new("Ada", Utc::now());
        ada.loyalty_points = points;
        let ada = db.customers().add(ada).await.unwrap();
        (db, ada)
    }

    #[tokio::test]
    async fn test_redeem_clamps_at_zero() {
        let (db, ada) = db_with_customer(40).await;

        let after = manage_points(&db, &ada.id, PointsAction::Redeem, 100).await.unwrap();
        assert_eq!(after.loyalty_points, 0);

        let after = manage_points(&db, &ada.id, PointsAction::Add, 260).await.unwrap();
        assert_eq!(after.loyalty_points, 260);
        assert_eq!(available_reward(&db, &ada.id).unwrap().unwrap().reward_cents, 1500);
    }

    #[tokio::test]
    async fn test_zero_points_rejected() {
        let (db, ada) = db_with_customer(40).await;
        let err = manage_points(&db, &ada.id, PointsAction::Add, 0).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
        assert_eq!(db.customers().require(&ada.id).unwrap().loyalty_points, 40);
    }

    #[tokio::test]
    async fn test_huge_add_rejected() {
        let (db, ada) = db_with_customer(10).await;
        let err = manage_points(&db, &ada.id, PointsAction::Add, i64::MAX).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
        assert_eq!(db.customers().require(&ada.id).unwrap().loyalty_points, 10);

        let after = manage_points(&db, &ada.id, PointsAction::Add, MAX_POINTS_CHANGE).await.unwrap();
        assert_eq!(after.loyalty_points, 10 + MAX_POINTS_CHANGE);
    }

    #[tokio::test]
    async fn test_overview() {
        let (db, ada) = db_with_customer(120).await;
        db.customers().add(Customer::new("Bob", Utc::now())).await.unwrap();

        let overview = loyalty_overview(&db);
        assert_eq!(overview.top_customers.len(), 1);
        assert_eq!(overview.top_customers[0].id, ada.id);
        assert_eq!(overview.tiers.len(), 4);
        assert_eq!(overview.points_outstanding, 120);
    }
}
