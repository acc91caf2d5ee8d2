//! # Customer Analytics
//!
//! Per-customer purchase summaries, rankings and segments.
//!
//! ## Frequency Bands
//! ```text
//! ┌──────────────┬──────────────────────┐
//! │  Band        │  Transactions        │
//! ├──────────────┼──────────────────────┤
//! │  frequent    │  50 or more          │
//! │  regular     │  20 – 49             │
//! │  occasional  │  5 – 19              │
//! │  rare        │  fewer than 5        │
//! └──────────────┴──────────────────────┘
//! ```
//!
//! Spend figures come from the customer's `total_spent`, which checkout
//! keeps up to date; transaction counts and dates come from the history.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Customer, Transaction};

/// No purchase for longer than this many days marks a customer at risk.
pub const AT_RISK_DAYS: i64 = 90;

/// Customers created within this many days count as new.
pub const NEW_CUSTOMER_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseFrequency {
    Rare,
    Occasional,
    Regular,
    Frequent,
}

impl PurchaseFrequency {
    pub fn from_count(transactions: usize) -> Self {
        match transactions {
            n if n >= 50 => PurchaseFrequency::Frequent,
            n if n >= 20 => PurchaseFrequency::Regular,
            n if n >= 5 => PurchaseFrequency::Occasional,
            _ => PurchaseFrequency::Rare,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerSummary {
    pub customer_id: String,
    pub customer_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub transaction_count: usize,
    pub total_spent_cents: i64,
    pub average_order_value_cents: i64,
    #[ts(as = "Option<String>")]
    pub first_purchase: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub last_purchase: Option<DateTime<Utc>>,
    pub days_since_last_purchase: Option<i64>,
    pub loyalty_points: i64,
    pub frequency: PurchaseFrequency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerRanking {
    pub rank: usize,
    pub customer_id: String,
    pub customer_name: String,
    pub email: Option<String>,
    pub total_spent_cents: i64,
    pub transaction_count: usize,
    pub loyalty_points: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Segment {
    pub count: usize,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerSegments {
    pub frequent: Segment,
    pub regular: Segment,
    pub occasional: Segment,
    pub rare: Segment,
    pub at_risk: Segment,
    pub new: Segment,
}

/// Purchase dates per customer id, completed sales only.
struct History<'a> {
    by_customer: HashMap<&'a str, Vec<DateTime<Utc>>>,
}

impl<'a> History<'a> {
    fn new(transactions: &'a [Transaction]) -> Self {
        let mut by_customer: HashMap<&str, Vec<DateTime<Utc>>> = HashMap::new();
        for txn in transactions.iter().filter(|t| t.is_completed()) {
            if let Some(id) = txn.customer_id.as_deref() {
                by_customer.entry(id).or_default().push(txn.created_at);
            }
        }
        History { by_customer }
    }

    fn dates(&self, customer_id: &str) -> &[DateTime<Utc>] {
        self.by_customer
            .get(customer_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn count(&self, customer_id: &str) -> usize {
        self.dates(customer_id).len()
    }

    fn last(&self, customer_id: &str) -> Option<DateTime<Utc>> {
        self.dates(customer_id).iter().max().copied()
    }
}

fn summarize(customer: &Customer, history: &History<'_>, now: DateTime<Utc>) -> CustomerSummary {
    let dates = history.dates(&customer.id);
    let count = dates.len();
    let last = dates.iter().max().copied();

    CustomerSummary {
        customer_id: customer.id.clone(),
        customer_name: customer.name.clone(),
        email: customer.email.clone(),
        phone: customer.phone.clone(),
        transaction_count: count,
        total_spent_cents: customer.total_spent_cents,
        average_order_value_cents: if count > 0 {
            customer.total_spent_cents / count as i64
        } else {
            0
        },
        first_purchase: dates.iter().min().copied(),
        last_purchase: last,
        days_since_last_purchase: last.map(|at| (now - at).num_days()),
        loyalty_points: customer.loyalty_points,
        frequency: PurchaseFrequency::from_count(count),
    }
}

pub fn customer_summary(
    customer: &Customer,
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> CustomerSummary {
    summarize(customer, &History::new(transactions), now)
}

/// Customers ranked by total spend, best first.
pub fn top_customers(
    customers: &[Customer],
    transactions: &[Transaction],
    limit: usize,
) -> Vec<CustomerRanking> {
    let history = History::new(transactions);
    let mut sorted: Vec<&Customer> = customers.iter().collect();
    sorted.sort_by(|a, b| b.total_spent_cents.cmp(&a.total_spent_cents));

    sorted
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, c)| CustomerRanking {
            rank: i + 1,
            customer_id: c.id.clone(),
            customer_name: c.name.clone(),
            email: c.email.clone(),
            total_spent_cents: c.total_spent_cents,
            transaction_count: history.count(&c.id),
            loyalty_points: c.loyalty_points,
        })
        .collect()
}

/// Customers who have bought before but not in the last `days` days.
pub fn at_risk_customers<'a>(
    customers: &'a [Customer],
    transactions: &[Transaction],
    days: i64,
    now: DateTime<Utc>,
) -> Vec<&'a Customer> {
    let history = History::new(transactions);
    customers
        .iter()
        .filter(|c| {
            history
                .last(&c.id)
                .map_or(false, |last| (now - last).num_days() > days)
        })
        .collect()
}

/// Customers created within the last `days` days.
pub fn new_customers(customers: &[Customer], days: i64, now: DateTime<Utc>) -> Vec<&Customer> {
    let cutoff = now - Duration::days(days);
    customers.iter().filter(|c| c.created_at > cutoff).collect()
}

pub fn customers_by_frequency<'a>(
    customers: &'a [Customer],
    transactions: &[Transaction],
    frequency: PurchaseFrequency,
) -> Vec<&'a Customer> {
    let history = History::new(transactions);
    customers
        .iter()
        .filter(|c| PurchaseFrequency::from_count(history.count(&c.id)) == frequency)
        .collect()
}

/// Head count and revenue per band, plus the at-risk and new groups.
///
/// The four frequency bands partition the customers; at-risk and new
/// overlap with them.
pub fn customer_segments(
    customers: &[Customer],
    transactions: &[Transaction],
    now: DateTime<Utc>,
) -> CustomerSegments {
    let history = History::new(transactions);
    let at_risk_cutoff = AT_RISK_DAYS;
    let new_cutoff = now - Duration::days(NEW_CUSTOMER_DAYS);

    let mut segments = CustomerSegments::default();
    for customer in customers {
        let add = |segment: &mut Segment| {
            segment.count += 1;
            segment.revenue_cents += customer.total_spent_cents;
        };

        match PurchaseFrequency::from_count(history.count(&customer.id)) {
            PurchaseFrequency::Frequent => add(&mut segments.frequent),
            PurchaseFrequency::Regular => add(&mut segments.regular),
            PurchaseFrequency::Occasional => add(&mut segments.occasional),
            PurchaseFrequency::Rare => add(&mut segments.rare),
        }

        let at_risk = history
            .last(&customer.id)
            .map_or(false, |last| (now - last).num_days() > at_risk_cutoff);
        if at_risk {
            add(&mut segments.at_risk);
        }
        if customer.created_at > new_cutoff {
            add(&mut segments.new);
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{product, sale};

    fn customer(name: &str, spent: i64, created: DateTime<Utc>) -> Customer {
        let mut c = Customer::new(name, created);
        c.total_spent_cents = spent;
        c
    }

    fn sales_for(customer: &Customer, count: usize, at: DateTime<Utc>) -> Vec<Transaction> {
        let tea = product("tea", 300, "drinks");
        (0..count)
            .map(|_| sale(vec![(tea.clone(), 1)], Some(&customer.id), at))
            .collect()
    }

    #[test]
    fn test_frequency_bands() {
        assert_eq!(PurchaseFrequency::from_count(0), PurchaseFrequency::Rare);
        assert_eq!(PurchaseFrequency::from_count(4), PurchaseFrequency::Rare);
        assert_eq!(PurchaseFrequency::from_count(5), PurchaseFrequency::Occasional);
        assert_eq!(PurchaseFrequency::from_count(20), PurchaseFrequency::Regular);
        assert_eq!(PurchaseFrequency::from_count(49), PurchaseFrequency::Regular);
        assert_eq!(PurchaseFrequency::from_count(50), PurchaseFrequency::Frequent);
    }

    #[test]
    fn test_summary() {
        let now = Utc::now();
        let ada = customer("Ada", 3000, now - Duration::days(400));
        let mut txns = sales_for(&ada, 2, now - Duration::days(10));
        txns.extend(sales_for(&ada, 1, now - Duration::days(3)));

        let summary = customer_summary(&ada, &txns, now);
        assert_eq!(summary.transaction_count, 3);
        assert_eq!(summary.average_order_value_cents, 1000);
        assert_eq!(summary.days_since_last_purchase, Some(3));
        assert_eq!(summary.first_purchase, Some(now - Duration::days(10)));
        assert_eq!(summary.frequency, PurchaseFrequency::Rare);
    }

    #[test]
    fn test_rankings_by_spend() {
        let now = Utc::now();
        let a = customer("A", 100, now);
        let b = customer("B", 900, now);
        let c = customer("C", 500, now);
        let txns = sales_for(&b, 2, now);

        let ranked = top_customers(&[a, b, c], &txns, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].customer_name, "B");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].transaction_count, 2);
        assert_eq!(ranked[1].customer_name, "C");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn test_at_risk_and_new() {
        let now = Utc::now();
        let lapsed = customer("Lapsed", 500, now - Duration::days(365));
        let active = customer("Active", 500, now - Duration::days(365));
        let never = customer("Never", 0, now - Duration::days(365));
        let fresh = customer("Fresh", 0, now - Duration::days(2));

        let mut txns = sales_for(&lapsed, 1, now - Duration::days(91));
        txns.extend(sales_for(&active, 1, now - Duration::days(5)));
        let all = [lapsed, active, never, fresh];

        let risk = at_risk_customers(&all, &txns, AT_RISK_DAYS, now);
        assert_eq!(risk.len(), 1);
        assert_eq!(risk[0].name, "Lapsed");

        let new = new_customers(&all, NEW_CUSTOMER_DAYS, now);
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].name, "Fresh");
    }

    #[test]
    fn test_segments() {
        let now = Utc::now();
        let loyal = customer("Loyal", 20_000, now - Duration::days(100));
        let casual = customer("Casual", 1_500, now - Duration::days(1));
        let mut txns = sales_for(&loyal, 20, now - Duration::days(1));
        txns.extend(sales_for(&casual, 1, now - Duration::days(120)));

        let all = [loyal, casual];
        let segments = customer_segments(&all, &txns, now);
        assert_eq!(segments.regular, Segment { count: 1, revenue_cents: 20_000 });
        assert_eq!(segments.rare, Segment { count: 1, revenue_cents: 1_500 });
        assert_eq!(segments.frequent.count, 0);
        assert_eq!(segments.at_risk.count, 1);
        assert_eq!(segments.new.count, 1);
        assert_eq!(
            customers_by_frequency(&all, &txns, PurchaseFrequency::Regular).len(),
            1
        );
    }
}
