//! # till-db: Local Storage Layer for the Till Back Office
//!
//! Every piece of back-office state lives in one SQLite key-value table,
//! one JSON document per key. Stores load their key once, keep it in
//! memory, and write the whole document back on every change.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Till Data Flow                                  │
//! │                                                                         │
//! │  admin command (checkout, complete_return, restore, ...)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     till-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │    Stores     │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (stores/*)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ ProductStore  │    │ 001_local_   │  │   │
//! │  │   │ LocalStorage  │◄───│ ReturnStore   │    │ storage.sql  │  │   │
//! │  │   │ backup.rs     │    │ UserStore ... │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  local_storage(key TEXT PRIMARY KEY, value TEXT, updated_at TEXT)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool and the [`Database`] handle
//! - [`kv`] - Raw key-value access
//! - [`keys`] - Storage key names
//! - [`store`] - Generic observable collection/singleton stores
//! - [`stores`] - One typed store per entity
//! - [`backup`] - Export, restore and clear
//! - [`demo`] - Demo catalog and customers
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("till.db")).await?;
//!
//! let low = db.products().low_stock();
//! let mut changes = db.products().subscribe();
//! db.products().update(&low[0].id, patch).await?;
//! changes.changed().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod demo;
pub mod error;
pub mod keys;
pub mod kv;
pub mod migrations;
pub mod pool;
pub mod store;
pub mod stores;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use kv::LocalStorage;
pub use pool::{Database, DbConfig};
pub use store::{CollectionStore, SingletonStore, Snapshot};
pub use stores::{
    CategoryStore, CustomerStore, DiscountStore, EmployeeStore, GiftCardStore, InventoryLogStore,
    LocationStore, ProductStore, ReturnStore, SettingsStore, SupplierStore, TransactionStore,
    UserStore, VoucherStore,
};
