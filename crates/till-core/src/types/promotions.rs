//! Discounts, vouchers and gift cards.
//!
//! The arithmetic over these records lives in [`crate::discount`] and
//! [`crate::gift_card`]; this module only holds the data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::{new_id, Entity};

// =============================================================================
// Discount
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `value` is a whole percent of the order amount.
    Percentage,
    /// `value` is an amount in cents.
    Fixed,
    /// Buy-N-get-M, described by [`BogoRule`].
    Bogo,
    /// Percentage that only applies once `min_order_cents` is reached.
    Conditional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BogoKind {
    Buy1Get1,
    Buy2Get1,
    Custom,
}

/// Buy-N-get-M rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BogoRule {
    pub kind: BogoKind,
    /// Free units per group for [`BogoKind::Custom`]; ignored otherwise.
    #[serde(default = "one")]
    pub get_quantity: i64,
    /// Percent off each "get" unit. 100 means free.
    #[serde(default = "hundred")]
    pub get_percent: u32,
}

fn one() -> i64 {
    1
}

fn hundred() -> u32 {
    100
}

impl BogoRule {
    pub fn buy_one_get_one_free() -> Self {
        BogoRule {
            kind: BogoKind::Buy1Get1,
            get_quantity: 1,
            get_percent: 100,
        }
    }

    /// Units that must be bought to qualify for the "get" units.
    pub fn buy_quantity(&self) -> i64 {
        match self.kind {
            BogoKind::Buy1Get1 | BogoKind::Custom => 1,
            BogoKind::Buy2Get1 => 2,
        }
    }

    /// Units discounted per qualifying group.
    pub fn get_quantity(&self) -> i64 {
        match self.kind {
            BogoKind::Buy1Get1 | BogoKind::Buy2Get1 => 1,
            BogoKind::Custom => self.get_quantity.max(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Discount {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    /// Whole percent or cents, depending on `discount_type`.
    pub value: i64,
    /// Empty means every product.
    #[serde(default)]
    pub applicable_products: Vec<String>,
    #[serde(default)]
    pub applicable_categories: Vec<String>,
    #[serde(default)]
    pub min_order_cents: Option<i64>,
    #[serde(default)]
    pub max_discount_cents: Option<i64>,
    #[serde(default)]
    pub bogo: Option<BogoRule>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub usage_count: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Discount {
    pub fn new(
        name: impl Into<String>,
        discount_type: DiscountType,
        value: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Discount {
            id: new_id(),
            name: name.into(),
            description: String::new(),
            discount_type,
            value,
            applicable_products: Vec::new(),
            applicable_categories: Vec::new(),
            min_order_cents: None,
            max_discount_cents: None,
            bogo: None,
            is_active: true,
            start_date: now,
            end_date: None,
            usage_limit: None,
            usage_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Active flag set, inside the date window and under the usage limit.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.start_date <= now
            && self.end_date.map_or(true, |end| end >= now)
            && self.usage_limit.map_or(true, |limit| self.usage_count < limit)
    }

    /// True when the discount is not restricted to a product list or the
    /// list contains `product_id`.
    pub fn applies_to_product(&self, product_id: &str) -> bool {
        self.applicable_products.is_empty()
            || self.applicable_products.iter().any(|id| id == product_id)
    }
}

impl Entity for Discount {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

patch_struct! {
    DiscountPatch for Discount {
        name: String,
        description: String,
        discount_type: DiscountType,
        value: i64,
        applicable_products: Vec<String>,
        applicable_categories: Vec<String>,
        min_order_cents: Option<i64>,
        max_discount_cents: Option<i64>,
        bogo: Option<BogoRule>,
        is_active: bool,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
        usage_limit: Option<u32>,
    }
}

// =============================================================================
// Voucher
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum VoucherType {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Voucher {
    pub id: String,
    pub code: String,
    /// Whole percent or cents, depending on `voucher_type`.
    pub value: i64,
    #[serde(rename = "type")]
    pub voucher_type: VoucherType,
    pub max_uses: u32,
    #[serde(default)]
    pub usage_count: u32,
    pub is_active: bool,
    #[ts(as = "String")]
    pub issued_date: DateTime<Utc>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub min_order_cents: Option<i64>,
    #[serde(default)]
    pub applicable_products: Vec<String>,
    /// Customer ids, one entry per redemption.
    #[serde(default)]
    pub redeemed_by: Vec<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Voucher {
    pub fn new(
        value: i64,
        voucher_type: VoucherType,
        max_uses: u32,
        expiry_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Voucher {
            id: new_id(),
            code: voucher_code(),
            value,
            voucher_type,
            max_uses,
            usage_count: 0,
            is_active: true,
            issued_date: now,
            expiry_date,
            min_order_cents: None,
            applicable_products: Vec::new(),
            redeemed_by: Vec::new(),
            created_at: now,
        }
    }

    pub fn has_uses_left(&self) -> bool {
        self.usage_count < self.max_uses
    }
}

impl Entity for Voucher {
    fn id(&self) -> &str {
        &self.id
    }
}

patch_struct! {
    VoucherPatch for Voucher {
        value: i64,
        voucher_type: VoucherType,
        max_uses: u32,
        is_active: bool,
        expiry_date: Option<DateTime<Utc>>,
        min_order_cents: Option<i64>,
        applicable_products: Vec<String>,
    }
}

/// `VOUCH` followed by six uppercase alphanumerics.
pub fn voucher_code() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("VOUCH{}", simple[..6].to_ascii_uppercase())
}

// =============================================================================
// Gift Card
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GiftCardTransactionKind {
    Purchase,
    Redemption,
    Reload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GiftCardTransaction {
    pub id: String,
    pub gift_card_id: String,
    pub amount_cents: i64,
    #[serde(rename = "type")]
    pub kind: GiftCardTransactionKind,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GiftCard {
    pub id: String,
    /// Masked number, `****NNNN`. Used as the lookup key.
    pub card_number: String,
    pub balance_cents: i64,
    pub original_amount_cents: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub issued_date: DateTime<Utc>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub purchased_by: Option<String>,
    #[serde(default)]
    pub usage_history: Vec<GiftCardTransaction>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl GiftCard {
    pub fn new(
        amount_cents: i64,
        expiry_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        GiftCard {
            id: new_id(),
            card_number: gift_card_number(),
            balance_cents: amount_cents,
            original_amount_cents: amount_cents,
            is_active: true,
            issued_date: now,
            expiry_date,
            purchased_by: None,
            usage_history: Vec::new(),
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.map_or(false, |expiry| expiry <= now)
    }
}

impl Entity for GiftCard {
    fn id(&self) -> &str {
        &self.id
    }
}

patch_struct! {
    GiftCardPatch for GiftCard {
        is_active: bool,
        expiry_date: Option<DateTime<Utc>>,
        purchased_by: Option<String>,
    }
}

/// Masked card number with four random digits.
pub fn gift_card_number() -> String {
    let digits = Uuid::new_v4().as_u128() % 10_000;
    format!("****{:04}", digits)
}
