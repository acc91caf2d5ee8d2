//! # Return Store
//!
//! Customer returns, restock records and refund policies
//! (`returns`, `restockRecords`, `refundPolicies`).
//!
//! ## Status Machine
//! ```text
//!              ┌──► approved ──► completed
//!   pending ───┼──► rejected
//!              └──► cancelled
//! ```
//! Anything else is refused with `InvalidReturnTransition` and nothing is
//! written. Putting sellable units back on the shelf when a return
//! completes touches the product store too, so that step lives in the
//! admin `complete_return` command.

use chrono::{DateTime, Utc};
use tracing::info;

use till_core::returns as rules;
use till_core::{
    new_id, ItemCondition, Money, PolicyScope, RefundMethod, RefundPolicy, RestockRecord, Return,
    ReturnItem, ReturnStatus,
};

use crate::error::DbResult;
use crate::keys;
use crate::kv::LocalStorage;
use crate::store::CollectionStore;

/// Location used when a return does not say where it was taken.
pub const DEFAULT_RETURN_LOCATION: &str = "loc-001";

#[derive(Clone)]
pub struct ReturnStore {
    returns: CollectionStore<Return>,
    restock: CollectionStore<RestockRecord>,
    policies: CollectionStore<RefundPolicy>,
}

impl ReturnStore {
    pub(crate) async fn open(storage: LocalStorage) -> DbResult<Self> {
        let returns = CollectionStore::open(storage.clone(), keys::RETURNS, "Return").await?;
        let restock =
            CollectionStore::open(storage.clone(), keys::RESTOCK_RECORDS, "RestockRecord").await?;
        let policies = CollectionStore::open_seeded(
            storage,
            keys::REFUND_POLICIES,
            "RefundPolicy",
            default_policies,
        )
        .await?;
        Ok(ReturnStore {
            returns,
            restock,
            policies,
        })
    }

    pub fn returns(&self) -> &CollectionStore<Return> {
        &self.returns
    }

    pub fn restock_records(&self) -> &CollectionStore<RestockRecord> {
        &self.restock
    }

    pub fn refund_policies(&self) -> &CollectionStore<RefundPolicy> {
        &self.policies
    }

    /// Records a new pending return.
    pub async fn create_return(
        &self,
        transaction_id: &str,
        items: Vec<ReturnItem>,
        customer_id: Option<String>,
        store_location_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<Return> {
        let location = store_location_id.unwrap_or(DEFAULT_RETURN_LOCATION);
        let ret = self
            .returns
            .add(Return::new(transaction_id, items, customer_id, location, now))
            .await?;
        info!(return_id = %ret.id, transaction = %transaction_id, "Return created");
        Ok(ret)
    }

    /// Moves a return to `status`, replacing its approval notes when given.
    pub async fn update_status(
        &self,
        return_id: &str,
        status: ReturnStatus,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DbResult<Return> {
        self.transition(return_id, |ret| rules::set_status(ret, status, notes, now))
            .await
    }

    /// Approves a pending return for `refund`.
    pub async fn approve(
        &self,
        return_id: &str,
        refund: Money,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DbResult<Return> {
        self.transition(return_id, |ret| rules::approve(ret, refund, notes, now))
            .await
    }

    pub async fn reject(&self, return_id: &str, notes: Option<String>, now: DateTime<Utc>) -> DbResult<Return> {
        self.update_status(return_id, ReturnStatus::Rejected, notes, now)
            .await
    }

    /// Completes an approved return, paying out by `method`.
    pub async fn complete(
        &self,
        return_id: &str,
        method: RefundMethod,
        now: DateTime<Utc>,
    ) -> DbResult<Return> {
        self.transition(return_id, |ret| rules::complete(ret, method, now))
            .await
    }

    async fn transition(
        &self,
        return_id: &str,
        f: impl FnOnce(&mut Return) -> till_core::CoreResult<()>,
    ) -> DbResult<Return> {
        let (ret, ()) = self
            .returns
            .update_with(return_id, |ret| Ok(f(ret)?))
            .await?;
        info!(return_id = %ret.id, status = ret.status.as_str(), "Return status changed");
        Ok(ret)
    }

    /// Records the inspected condition of returned units.
    ///
    /// The product must be on the return and the return's records for it
    /// may not add up to more units than were returned.
    pub async fn add_restock_record(
        &self,
        return_id: &str,
        product_id: &str,
        quantity: i64,
        condition: ItemCondition,
        now: DateTime<Utc>,
    ) -> DbResult<RestockRecord> {
        let ret = self.returns.require(return_id)?;
        self.restock
            .modify(|records| {
                rules::validate_inspection(&ret, records, product_id, quantity)?;
                let record = RestockRecord::new(return_id, product_id, quantity, condition, now);
                records.push(record.clone());
                Ok(record)
            })
            .await
    }

    /// `(product_id, quantity)` pairs that may go back on the shelf.
    pub fn sellable_restock(&self, return_id: &str) -> Vec<(String, i64)> {
        rules::sellable_restock(&self.restock.list(), return_id)
            .into_iter()
            .map(|(product_id, quantity)| (product_id.to_string(), quantity))
            .collect()
    }

    /// Refund for `items` under `policy_id`'s restock fee, or the default
    /// fee when no (known) policy is given.
    pub fn calculate_refund(&self, items: &[ReturnItem], policy_id: Option<&str>) -> Money {
        let policy = policy_id.and_then(|id| self.policies.get(id));
        rules::calculate_refund(items, rules::restock_fee_percent(policy.as_ref()))
    }

    pub fn by_customer(&self, customer_id: &str) -> Vec<Return> {
        self.returns
            .filter(|r| r.customer_id.as_deref() == Some(customer_id))
    }

    pub fn by_status(&self, status: ReturnStatus) -> Vec<Return> {
        self.returns.filter(|r| r.status == status)
    }

    /// Adds a policy under a fresh id.
    pub async fn create_refund_policy(&self, mut policy: RefundPolicy, now: DateTime<Utc>) -> DbResult<RefundPolicy> {
        policy.id = new_id();
        policy.created_at = now;
        self.policies.add(policy).await
    }

    pub async fn reload(&self) -> DbResult<()> {
        self.returns.reload().await?;
        self.restock.reload().await?;
        self.policies.reload().await
    }
}

fn default_policies(now: DateTime<Utc>) -> Vec<RefundPolicy> {
    vec![
        RefundPolicy {
            id: "policy-001".into(),
            name: "Standard Return Policy".into(),
            return_window_days: 30,
            requires_receipt: true,
            allow_partial_return: true,
            requires_inspection: true,
            applied_to: PolicyScope::All,
            applicable_product_ids: Vec::new(),
            restock_fee_percent: 10,
            is_active: true,
            created_at: now,
        },
        RefundPolicy {
            id: "policy-002".into(),
            name: "Electronics Return Policy".into(),
            return_window_days: 14,
            requires_receipt: true,
            allow_partial_return: false,
            requires_inspection: true,
            applied_to: PolicyScope::SpecificProducts,
            applicable_product_ids: Vec::new(),
            restock_fee_percent: 15,
            is_active: true,
            created_at: now,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use till_core::{CoreError, ReturnReason};

    fn items() -> Vec<ReturnItem> {
        vec![ReturnItem::new("p-1", "Kettle", 2, 2_000, ReturnReason::Defective)]
    }

    #[tokio::test]
    async fn test_refund_uses_policy_fee() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let returns = db.returns();

        assert_eq!(returns.calculate_refund(&items(), None).cents(), 3_600);
        assert_eq!(returns.calculate_refund(&items(), Some("policy-002")).cents(), 3_400);
        assert_eq!(returns.calculate_refund(&items(), Some("unknown")).cents(), 3_600);
    }

    #[tokio::test]
    async fn test_happy_path_and_lookups() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let returns = db.returns();

        let ret = returns
            .create_return("txn-1", items(), Some("c-1".into()), None, now)
            .await
            .unwrap();
        assert_eq!(ret.store_location_id, DEFAULT_RETURN_LOCATION);
        assert_eq!(returns.by_status(ReturnStatus::Pending).len(), 1);

        returns
            .approve(&ret.id, Money::from_cents(3_600), Some("ok".into()), now)
            .await
            .unwrap();
        let done = returns.complete(&ret.id, RefundMethod::Card, now).await.unwrap();

        assert_eq!(done.status, ReturnStatus::Completed);
        assert_eq!(done.refund_cents, 3_600);
        assert_eq!(done.refund_method, RefundMethod::Card);
        assert_eq!(done.completed_at, Some(now));
        assert_eq!(returns.by_customer("c-1").len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_transition_is_not_written() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let returns = db.returns();
        let ret = returns
            .create_return("txn-1", items(), None, Some("loc-002"), now)
            .await
            .unwrap();

        returns.reject(&ret.id, Some("no receipt".into()), now).await.unwrap();
        let err = returns
            .complete(&ret.id, RefundMethod::Cash, now)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InvalidReturnTransition { .. })
        ));
        assert_eq!(
            returns.returns().get(&ret.id).unwrap().status,
            ReturnStatus::Rejected
        );
    }

    #[tokio::test]
    async fn test_sellable_restock_only() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let returns = db.returns();
        let mut lines = items();
        lines.push(ReturnItem::new("p-2", "Toaster", 1, 3_000, ReturnReason::Defective));
        let ret = returns.create_return("txn-1", lines, None, None, now).await.unwrap();

        returns
            .add_restock_record(&ret.id, "p-1", 2, ItemCondition::Sellable, now)
            .await
            .unwrap();
        returns
            .add_restock_record(&ret.id, "p-2", 1, ItemCondition::Damaged, now)
            .await
            .unwrap();

        assert_eq!(returns.sellable_restock(&ret.id), vec![("p-1".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_restock_record_is_checked_against_the_return() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let returns = db.returns();
        let ret = returns.create_return("txn-1", items(), None, None, now).await.unwrap();

        for (product, qty) in [("p-1", -10), ("p-1", 0), ("p-1", 3), ("p-9", 1)] {
            let err = returns
                .add_restock_record(&ret.id, product, qty, ItemCondition::Sellable, now)
                .await
                .unwrap_err();
            assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        }
        assert!(matches!(
            returns
                .add_restock_record("r-missing", "p-1", 1, ItemCondition::Sellable, now)
                .await,
            Err(DbError::NotFound { .. })
        ));
        assert!(returns.restock_records().is_empty());
        assert!(returns.sellable_restock(&ret.id).is_empty());
    }
}
