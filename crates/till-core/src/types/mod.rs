//! # Domain Types
//!
//! Plain records for every back-office entity.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                                   │
//! │                                                                         │
//! │  catalog     Product, Category, Supplier                                │
//! │  customer    Customer                                                   │
//! │  sales       CartItem, Transaction, PaymentMethod, TransactionStatus    │
//! │  inventory   InventoryLog, InventoryLogType                             │
//! │  settings    StoreSettings (singleton)                                  │
//! │  promotions  Discount, Voucher, GiftCard, GiftCardTransaction           │
//! │  staff       Employee, ShiftRecord, User                                │
//! │  returns     Return, ReturnItem, RestockRecord, RefundPolicy            │
//! │  location    StoreLocation                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Relationships
//! Entities refer to each other by string id only. Nothing enforces that the
//! target exists: deleting a category leaves products pointing at it, and
//! display code resolves names with a linear `find`.
//!
//! ## Partial Updates
//! Mutable entities come with a `*Patch` struct whose fields are all
//! `Option`. `patch.apply(&mut entity)` overwrites only the fields that are
//! `Some`, mirroring a shallow object merge.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Declares a `*Patch` struct with one `Option` per listed field and an
/// `apply` method that merges the present fields into the target.
macro_rules! patch_struct {
    (
        $(#[$meta:meta])*
        $patch:ident for $target:ident { $($field:ident : $ty:ty),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $patch {
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl $patch {
            /// Merges every `Some` field into `target`.
            pub fn apply(self, target: &mut $target) {
                $(
                    if let Some(value) = self.$field {
                        target.$field = value;
                    }
                )*
            }

            /// True when no field is set.
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())*
            }
        }

        impl $crate::types::Patch<$target> for $patch {
            fn apply_to(self, target: &mut $target) {
                self.apply(target)
            }
        }
    };
}

mod catalog;
mod customer;
mod inventory;
mod location;
mod promotions;
mod returns;
mod sales;
mod settings;
mod staff;

pub use catalog::*;
pub use customer::*;
pub use inventory::*;
pub use location::*;
pub use promotions::*;
pub use returns::*;
pub use sales::*;
pub use settings::*;
pub use staff::*;

// =============================================================================
// Entity
// =============================================================================

/// A record kept in a collection store.
///
/// Stores only need to find records by id and refresh their modification
/// timestamp; everything else about an entity is opaque to them.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The record's id.
    fn id(&self) -> &str;

    /// Called after every update. Entities with an `updated_at` field set it.
    fn touch(&mut self, _now: DateTime<Utc>) {}
}

/// A partial update for `T`, generated by `patch_struct!`.
pub trait Patch<T> {
    fn apply_to(self, target: &mut T);
}

/// Generates a fresh random entity id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 700 bps = 7%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(7.0);
        assert_eq!(rate.bps(), 700);
        assert!((rate.percentage() - 7.0).abs() < 0.001);
    }

    #[test]
    fn test_new_id_is_uuid() {
        let id = new_id();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_ne!(id, new_id());
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut category = Category::new("Drinks", Utc::now());
        let patch = CategoryPatch {
            description: Some(Some("Cold drinks".to_string())),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        patch.apply(&mut category);

        assert_eq!(category.name, "Drinks");
        assert_eq!(category.description.as_deref(), Some("Cold drinks"));
        assert!(CategoryPatch::default().is_empty());
    }
}
