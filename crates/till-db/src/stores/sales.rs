//! # Sales Stores
//!
//! Customers, the transaction history and the inventory log.
//!
//! Transactions and inventory logs are append-mostly: the checkout
//! workflow adds to them, and the only edits are status changes (refunds,
//! cancellations) and notes.

use std::ops::Deref;

use till_core::{Customer, InventoryLog, Transaction, TransactionStatus};

use crate::error::DbResult;
use crate::keys;
use crate::kv::LocalStorage;
use crate::store::CollectionStore;

// =============================================================================
// Customers
// =============================================================================

#[derive(Clone)]
pub struct CustomerStore {
    inner: CollectionStore<Customer>,
}

impl Deref for CustomerStore {
    type Target = CollectionStore<Customer>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl CustomerStore {
    pub(crate) async fn open(storage: LocalStorage) -> DbResult<Self> {
        let inner = CollectionStore::open(storage, keys::CUSTOMERS, "Customer").await?;
        Ok(CustomerStore { inner })
    }

    /// Customers whose name, email or phone contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<Customer> {
        let query = query.trim().to_lowercase();
        let matches = |field: &Option<String>| {
            field
                .as_deref()
                .map_or(false, |v| v.to_lowercase().contains(&query))
        };
        self.filter(|c| {
            query.is_empty()
                || c.name.to_lowercase().contains(&query)
                || matches(&c.email)
                || matches(&c.phone)
        })
    }

    /// Appends `customers` in one write (CSV import).
    pub async fn append(&self, customers: Vec<Customer>) -> DbResult<usize> {
        let count = customers.len();
        self.modify(|items| {
            items.extend(customers);
            Ok(count)
        })
        .await
    }
}

// =============================================================================
// Transactions
// =============================================================================

#[derive(Clone)]
pub struct TransactionStore {
    inner: CollectionStore<Transaction>,
}

impl Deref for TransactionStore {
    type Target = CollectionStore<Transaction>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl TransactionStore {
    pub(crate) async fn open(storage: LocalStorage) -> DbResult<Self> {
        let inner = CollectionStore::open(storage, keys::TRANSACTIONS, "Transaction").await?;
        Ok(TransactionStore { inner })
    }

    /// A customer's purchase history, newest first.
    pub fn by_customer(&self, customer_id: &str) -> Vec<Transaction> {
        let mut history = self.filter(|t| t.customer_id.as_deref() == Some(customer_id));
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        history
    }

    pub fn by_number(&self, transaction_number: &str) -> Option<Transaction> {
        self.find(|t| t.transaction_number == transaction_number)
    }

    pub fn by_status(&self, status: TransactionStatus) -> Vec<Transaction> {
        self.filter(|t| t.status == status)
    }
}

// =============================================================================
// Inventory Log
// =============================================================================

#[derive(Clone)]
pub struct InventoryLogStore {
    inner: CollectionStore<InventoryLog>,
}

impl Deref for InventoryLogStore {
    type Target = CollectionStore<InventoryLog>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl InventoryLogStore {
    pub(crate) async fn open(storage: LocalStorage) -> DbResult<Self> {
        let inner = CollectionStore::open(storage, keys::INVENTORY_LOGS, "InventoryLog").await?;
        Ok(InventoryLogStore { inner })
    }

    /// Movements of one product, newest first.
    pub fn for_product(&self, product_id: &str) -> Vec<InventoryLog> {
        let mut logs = self.filter(|l| l.product_id == product_id);
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        logs
    }

    /// Appends several log entries in one write.
    pub async fn append(&self, logs: Vec<InventoryLog>) -> DbResult<()> {
        if logs.is_empty() {
            return Ok(());
        }
        self.modify(|items| {
            items.extend(logs);
            Ok(())
        })
        .await
    }
}
