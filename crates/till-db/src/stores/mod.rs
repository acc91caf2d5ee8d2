//! # Stores
//!
//! One store per storage key (or small group of keys), each built on
//! [`CollectionStore`](crate::store::CollectionStore) or
//! [`SingletonStore`](crate::store::SingletonStore).
//!
//! ## Store Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Store              Keys                                   Seeded      │
//! │  ─────────────────  ─────────────────────────────────────  ──────────  │
//! │  ProductStore       products                                           │
//! │  CategoryStore      categories                                         │
//! │  SupplierStore      suppliers                                          │
//! │  CustomerStore      customers                                          │
//! │  TransactionStore   transactions                                       │
//! │  InventoryLogStore  inventoryLogs                                      │
//! │  SettingsStore      storeSettings                          defaults    │
//! │  DiscountStore      discounts                              3 promos    │
//! │  GiftCardStore      giftCards                              1 card      │
//! │  VoucherStore       vouchers                               WELCOME10   │
//! │  EmployeeStore      employees, shiftRecords                2 staff     │
//! │  ReturnStore        returns, restockRecords, refundPolicies 2 policies │
//! │  LocationStore      storeLocations, selectedLocationId     2 shops     │
//! │  UserStore          users, currentUser                     admin       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Typed stores deref to their `CollectionStore`, so the generic CRUD
//! (`list`, `get`, `add`, `update`, `remove`, `subscribe`) is always there
//! next to the entity-specific queries.

use chrono::{DateTime, NaiveDate, Utc};

use till_core::StoreSettings;

use crate::error::DbResult;
use crate::keys;
use crate::kv::LocalStorage;
use crate::store::SingletonStore;

pub mod catalog;
pub mod discount;
pub mod location;
pub mod promotions;
pub mod returns;
pub mod sales;
pub mod staff;
pub mod user;

pub use catalog::{CategoryStore, ProductStore, SupplierStore};
pub use discount::DiscountStore;
pub use location::LocationStore;
pub use promotions::{GiftCardStore, VoucherStore};
pub use returns::ReturnStore;
pub use sales::{CustomerStore, InventoryLogStore, TransactionStore};
pub use staff::EmployeeStore;
pub use user::UserStore;

pub(crate) use catalog::{open_categories, open_suppliers};

/// Store settings. A missing key reads as [`StoreSettings::default`].
pub type SettingsStore = SingletonStore<StoreSettings>;

pub(crate) async fn open_settings(storage: LocalStorage) -> DbResult<SettingsStore> {
    SingletonStore::open(storage, keys::STORE_SETTINGS).await
}

/// Midnight UTC on the given day, for seed dates.
pub(crate) fn utc_date(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
