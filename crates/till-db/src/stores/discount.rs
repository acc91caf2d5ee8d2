//! # Discount Store
//!
//! Promotional discounts and their usage counters.
//!
//! The amount math lives in `till_core::discount`; this store only finds
//! the right discount and keeps `usage_count` current.

use std::ops::Deref;

use chrono::{DateTime, Utc};
use tracing::info;

use till_core::discount as rules;
use till_core::{BogoRule, CartItem, Discount, DiscountType, Money};

use crate::error::DbResult;
use crate::keys;
use crate::kv::LocalStorage;
use crate::store::CollectionStore;
use crate::stores::utc_date;

#[derive(Clone)]
pub struct DiscountStore {
    inner: CollectionStore<Discount>,
}

impl Deref for DiscountStore {
    type Target = CollectionStore<Discount>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DiscountStore {
    pub(crate) async fn open(storage: LocalStorage) -> DbResult<Self> {
        let inner =
            CollectionStore::open_seeded(storage, keys::DISCOUNTS, "Discount", default_discounts)
                .await?;
        Ok(DiscountStore { inner })
    }

    /// Creates a discount with a fresh id and a zero usage count.
    pub async fn create(
        &self,
        name: &str,
        discount_type: DiscountType,
        value: i64,
        now: DateTime<Utc>,
    ) -> DbResult<Discount> {
        self.add(Discount::new(name, discount_type, value, now)).await
    }

    /// Discounts usable at `now`.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Discount> {
        rules::active_discounts(&self.list(), now)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Usable discounts covering `product_id`.
    pub fn for_product(&self, product_id: &str, now: DateTime<Utc>) -> Vec<Discount> {
        rules::discounts_for_product(&self.list(), product_id, now)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Discount `id` would give on `amount`. Unknown ids give zero.
    pub fn calculate(&self, id: &str, amount: Money) -> Money {
        self.get(id)
            .map_or(Money::zero(), |d| rules::calculate_discount(&d, amount))
    }

    /// Discount `id` would give on a whole cart, BOGO included.
    pub fn calculate_for_cart(&self, id: &str, items: &[CartItem]) -> Money {
        self.get(id)
            .map_or(Money::zero(), |d| rules::cart_discount(&d, items))
    }

    /// Counts one use of discount `id`.
    pub async fn record_usage(&self, id: &str) -> DbResult<Discount> {
        let (discount, ()) = self
            .update_with(id, |d| {
                d.usage_count += 1;
                Ok(())
            })
            .await?;
        info!(discount = %discount.name, uses = discount.usage_count, "Discount used");
        Ok(discount)
    }
}

/// The promotions a fresh install starts with.
fn default_discounts(now: DateTime<Utc>) -> Vec<Discount> {
    let mut summer = Discount::new("Summer Sale", DiscountType::Percentage, 20, now);
    summer.id = "disc-001".into();
    summer.description = "20% off all products".into();
    summer.start_date = utc_date(2024, 6, 1).unwrap_or(now);
    summer.end_date = utc_date(2024, 8, 31);

    let mut bogo = Discount::new("Buy One Get One Free", DiscountType::Bogo, 0, now);
    bogo.id = "disc-002".into();
    bogo.description = "Buy 1, Get 1 Free on selected items".into();
    bogo.bogo = Some(BogoRule::buy_one_get_one_free());

    let mut five_off = Discount::new("$5 Off", DiscountType::Fixed, 500, now);
    five_off.id = "disc-003".into();
    five_off.description = "Fixed $5 off on purchases over $25".into();
    five_off.min_order_cents = Some(2500);

    vec![summer, bogo, five_off]
}
