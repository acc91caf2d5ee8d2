//! # Database Handle
//!
//! Opens the SQLite file, runs migrations and hydrates every store.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Database::new(config)                           │
//! │                                                                         │
//! │  DbConfig::new(path)        ← pool size, timeouts                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqlitePool (WAL, synchronous=NORMAL)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  migrations ──► local_storage(key, value, updated_at)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │ Stores (one per key, hydrated now, seeded on a fresh install)   │   │
//! │  │  products  categories  customers  transactions  inventoryLogs   │   │
//! │  │  suppliers  storeSettings  discounts  giftCards  vouchers       │   │
//! │  │  employees+shifts  returns+restock+policies  locations  users   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! Readers don't block the writer, and the admin tool can read a database
//! the till has open.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::kv::LocalStorage;
use crate::migrations;
use crate::stores::{
    self, CategoryStore, CustomerStore, DiscountStore, EmployeeStore, GiftCardStore,
    InventoryLogStore, LocationStore, ProductStore, ReturnStore, SettingsStore, SupplierStore,
    TransactionStore, UserStore, VoucherStore,
};

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/till.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps connections
    /// open for the life of the pool.
    pub idle_timeout: Option<Duration>,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for the database file at `path`. The file is
    /// created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect. When off, the schema must
    /// already be in place.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// An isolated in-memory database (for tests).
    ///
    /// The single connection is never recycled: closing it would drop the
    /// data.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

struct Stores {
    products: ProductStore,
    categories: CategoryStore,
    customers: CustomerStore,
    transactions: TransactionStore,
    inventory_logs: InventoryLogStore,
    suppliers: SupplierStore,
    settings: SettingsStore,
    discounts: DiscountStore,
    gift_cards: GiftCardStore,
    vouchers: VoucherStore,
    employees: EmployeeStore,
    returns: ReturnStore,
    locations: LocationStore,
    users: UserStore,
}

impl Stores {
    async fn open(storage: &LocalStorage) -> DbResult<Self> {
        Ok(Stores {
            products: ProductStore::open(storage.clone()).await?,
            categories: stores::open_categories(storage.clone()).await?,
            customers: CustomerStore::open(storage.clone()).await?,
            transactions: TransactionStore::open(storage.clone()).await?,
            inventory_logs: InventoryLogStore::open(storage.clone()).await?,
            suppliers: stores::open_suppliers(storage.clone()).await?,
            settings: stores::open_settings(storage.clone()).await?,
            discounts: DiscountStore::open(storage.clone()).await?,
            gift_cards: GiftCardStore::open(storage.clone()).await?,
            vouchers: VoucherStore::open(storage.clone()).await?,
            employees: EmployeeStore::open(storage.clone()).await?,
            returns: ReturnStore::open(storage.clone()).await?,
            locations: LocationStore::open(storage.clone()).await?,
            users: UserStore::open(storage.clone()).await?,
        })
    }
}

/// The back office's data: the pool plus every store.
///
/// Cloning is cheap and clones share the same stores, so a write through
/// one clone is seen by all of them.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    storage: LocalStorage,
    stores: Arc<Stores>,
}

impl Database {
    /// Connects, migrates and hydrates.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL journal, NORMAL synchronous
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    /// 5. Opens every store, seeding keys that were never written
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            // may lose the last write on power loss, never corrupts
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);
        if config.idle_timeout.is_none() {
            pool_options = pool_options.max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        if config.run_migrations {
            info!("Running database migrations");
            migrations::run_migrations(&pool).await?;
            info!("Migrations complete");
        }

        let storage = LocalStorage::new(pool.clone());
        let stores = Stores::open(&storage).await?;
        info!("Stores hydrated");

        Ok(Database {
            pool,
            storage,
            stores: Arc::new(stores),
        })
    }

    /// For advanced queries; prefer the stores.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The raw key-value table underneath the stores.
    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    pub fn products(&self) -> &ProductStore {
        &self.stores.products
    }

    pub fn categories(&self) -> &CategoryStore {
        &self.stores.categories
    }

    pub fn customers(&self) -> &CustomerStore {
        &self.stores.customers
    }

    pub fn transactions(&self) -> &TransactionStore {
        &self.stores.transactions
    }

    pub fn inventory_logs(&self) -> &InventoryLogStore {
        &self.stores.inventory_logs
    }

    pub fn suppliers(&self) -> &SupplierStore {
        &self.stores.suppliers
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.stores.settings
    }

    pub fn discounts(&self) -> &DiscountStore {
        &self.stores.discounts
    }

    pub fn gift_cards(&self) -> &GiftCardStore {
        &self.stores.gift_cards
    }

    pub fn vouchers(&self) -> &VoucherStore {
        &self.stores.vouchers
    }

    pub fn employees(&self) -> &EmployeeStore {
        &self.stores.employees
    }

    pub fn returns(&self) -> &ReturnStore {
        &self.stores.returns
    }

    pub fn locations(&self) -> &LocationStore {
        &self.stores.locations
    }

    pub fn users(&self) -> &UserStore {
        &self.stores.users
    }

    /// Re-reads every store from storage (after a restore or clear).
    /// Keys that are now missing get their seed again.
    pub async fn reload_all(&self) -> DbResult<()> {
        let s = &self.stores;
        s.products.reload().await?;
        s.categories.reload().await?;
        s.customers.reload().await?;
        s.transactions.reload().await?;
        s.inventory_logs.reload().await?;
        s.suppliers.reload().await?;
        s.settings.reload().await?;
        s.discounts.reload().await?;
        s.gift_cards.cards().reload().await?;
        s.vouchers.vouchers().reload().await?;
        s.employees.reload().await?;
        s.returns.reload().await?;
        s.locations.reload().await?;
        s.users.reload().await?;
        info!("All stores reloaded");
        Ok(())
    }

    /// Closes the pool. Store writes fail afterwards.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
        assert!(db.products().is_empty());
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/till.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(config.idle_timeout.is_some());
    }

    #[tokio::test]
    async fn test_clones_share_stores() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let other = db.clone();
        other
            .categories()
            .add(till_core::Category::new("Drinks", chrono::Utc::now()))
            .await
            .unwrap();
        assert_eq!(db.categories().len(), 1);
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let path = std::env::temp_dir().join(format!("till-{}.db", till_core::new_id()));
        {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            db.locations().select("loc-002").await.unwrap();
            db.close().await;
        }
        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(db.locations().selected_id().as_deref(), Some("loc-002"));
        db.close().await;
        let _ = std::fs::remove_file(&path);
    }
}
