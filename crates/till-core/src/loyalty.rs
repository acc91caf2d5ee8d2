//! # Loyalty Points
//!
//! ```text
//! ┌──────────┬──────────────┐
//! │  Points  │  Reward      │
//! ├──────────┼──────────────┤
//! │   100    │  $5 off      │
//! │   250    │  $15 off     │
//! │   500    │  $35 off     │
//! │  1000    │  $80 off     │
//! └──────────┴──────────────┘
//! ```
//!
//! Balances never go below zero: redeeming more than the balance empties it.
//! One operation moves at most [`MAX_POINTS_CHANGE`] points.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Customer;
use crate::validation::{validate_bounded, MAX_POINTS_CHANGE};

/// How many customers the leaderboard shows.
pub const TOP_CUSTOMERS_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PointsAction {
    Add,
    Redeem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RewardTier {
    pub points: i64,
    pub reward_cents: i64,
}

pub const REWARD_TIERS: [RewardTier; 4] = [
    RewardTier {
        points: 100,
        reward_cents: 500,
    },
    RewardTier {
        points: 250,
        reward_cents: 1500,
    },
    RewardTier {
        points: 500,
        reward_cents: 3500,
    },
    RewardTier {
        points: 1000,
        reward_cents: 8000,
    },
];

/// New balance after adding or redeeming `points`.
pub fn apply_points(balance: i64, action: PointsAction, points: i64) -> CoreResult<i64> {
    validate_bounded("points", points, MAX_POINTS_CHANGE)?;
    let balance = match action {
        PointsAction::Add => balance
            .checked_add(points)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "loyalty_points".to_string(),
                min: 0,
                max: i64::MAX,
            })?,
        PointsAction::Redeem => balance.saturating_sub(points).max(0),
    };
    Ok(balance)
}

/// Highest tier the balance has reached.
pub fn best_tier(points: i64) -> Option<RewardTier> {
    REWARD_TIERS
        .iter()
        .rev()
        .find(|tier| tier.points <= points)
        .copied()
}

/// Points earned on a purchase: `points_per_unit` per whole currency unit.
pub fn points_for_purchase(total: Money, points_per_unit: i64) -> i64 {
    total.whole_units().max(0) * points_per_unit.max(0)
}

/// Customers holding points, highest balance first.
pub fn top_customers(customers: &[Customer], limit: usize) -> Vec<&Customer> {
    let mut holders: Vec<&Customer> = customers.iter().filter(|c| c.loyalty_points > 0).collect();
    holders.sort_by(|a, b| b.loyalty_points.cmp(&a.loyalty_points));
    holders.truncate(limit);
    holders
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_redeem_never_goes_negative() {
        assert_eq!(apply_points(120, PointsAction::Redeem, 50).unwrap(), 70);
        assert_eq!(apply_points(30, PointsAction::Redeem, 50).unwrap(), 0);
        assert_eq!(apply_points(0, PointsAction::Redeem, 1).unwrap(), 0);
        assert_eq!(apply_points(30, PointsAction::Add, 50).unwrap(), 80);
    }

    #[test]
    fn test_points_change_is_bounded() {
        assert!(apply_points(10, PointsAction::Add, 0).is_err());
        assert_eq!(
            apply_points(10, PointsAction::Add, MAX_POINTS_CHANGE).unwrap(),
            10 + MAX_POINTS_CHANGE
        );
        assert!(apply_points(10, PointsAction::Add, MAX_POINTS_CHANGE + 1).is_err());
        assert!(apply_points(10, PointsAction::Add, i64::MAX).is_err());
        assert!(apply_points(i64::MAX - 5, PointsAction::Add, 10).is_err());
        assert_eq!(apply_points(i64::MIN, PointsAction::Redeem, 10).unwrap(), 0);
    }

    #[test]
    fn test_best_tier() {
        assert_eq!(best_tier(99), None);
        assert_eq!(best_tier(100).map(|t| t.reward_cents), Some(500));
        assert_eq!(best_tier(499).map(|t| t.reward_cents), Some(1500));
        assert_eq!(best_tier(5000).map(|t| t.points), Some(1000));
    }

    #[test]
    fn test_points_for_purchase_uses_whole_units() {
        assert_eq!(points_for_purchase(Money::from_cents(4299), 1), 42);
        assert_eq!(points_for_purchase(Money::from_cents(4299), 2), 84);
        assert_eq!(points_for_purchase(Money::from_cents(99), 1), 0);
    }

    #[test]
    fn test_top_customers_skips_zero_balances() {
        let now = Utc::now();
        let mut customers: Vec<Customer> = (0..3).map(|i| Customer::new(format!("c{i}"), now)).collect();
        customers[0].loyalty_points = 10;
        customers[2].loyalty_points = 300;

        let top = top_customers(&customers, TOP_CUSTOMERS_LIMIT);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "c2");
    }
}
