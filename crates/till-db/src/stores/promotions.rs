//! # Gift Card & Voucher Stores
//!
//! Gift cards are looked up by their masked card number, vouchers by code.
//!
//! ```text
//! create_gift_card($100) ──► ****4821  balance $100
//! redeem(****4821, $30)  ──► balance $70   history: [redemption $30]
//! reload(****4821, $20)  ──► balance $90   history: [..., reload $20]
//! ```

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use till_core::discount::{validate_voucher, voucher_discount};
use till_core::{
    gift_card, gift_card_number, CoreError, GiftCard, GiftCardTransaction,
    GiftCardTransactionKind, Money, Voucher, VoucherType,
};

use crate::error::DbResult;
use crate::keys;
use crate::kv::LocalStorage;
use crate::store::CollectionStore;
use crate::stores::utc_date;

/// Attempts at drawing a card number that is not already issued.
const CARD_NUMBER_ATTEMPTS: usize = 32;

// =============================================================================
// Gift Cards
// =============================================================================

#[derive(Clone)]
pub struct GiftCardStore {
    cards: CollectionStore<GiftCard>,
}

impl GiftCardStore {
    pub(crate) async fn open(storage: LocalStorage) -> DbResult<Self> {
        let cards =
            CollectionStore::open_seeded(storage, keys::GIFT_CARDS, "GiftCard", default_gift_cards)
                .await?;
        Ok(GiftCardStore { cards })
    }

    /// The underlying collection, for listing and plain CRUD.
    pub fn cards(&self) -> &CollectionStore<GiftCard> {
        &self.cards
    }

    pub fn by_number(&self, card_number: &str) -> Option<GiftCard> {
        self.cards.find(|c| c.card_number == card_number)
    }

    /// Issues a new card holding `amount`.
    pub async fn create_gift_card(
        &self,
        amount: Money,
        expiry_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DbResult<GiftCard> {
        till_core::validation::validate_positive("amount", amount.cents()).map_err(CoreError::from)?;

        let mut card = GiftCard::new(amount.cents(), expiry_date, now);
        for _ in 0..CARD_NUMBER_ATTEMPTS {
            if self.by_number(&card.card_number).is_none() {
                break;
            }
            card.card_number = gift_card_number();
        }
        if self.by_number(&card.card_number).is_some() {
            warn!(card_number = %card.card_number, "Issuing gift card with a duplicate number");
        }

        let card = self.cards.add(card).await?;
        info!(card_number = %card.card_number, amount = %amount, "Gift card issued");
        Ok(card)
    }

    /// Takes `amount` off the card. Fails without writing when the card is
    /// unknown, inactive, expired or short of balance.
    pub async fn redeem_gift_card(
        &self,
        card_number: &str,
        amount: Money,
        transaction_id: Option<String>,
        now: DateTime<Utc>,
    ) -> DbResult<GiftCard> {
        let id = self.require_id(card_number)?;
        let (card, ()) = self
            .cards
            .update_with(&id, |card| {
                gift_card::redeem(card, amount, transaction_id, now)?;
                Ok(())
            })
            .await?;
        info!(card_number = %card_number, amount = %amount, "Gift card redeemed");
        Ok(card)
    }

    /// Adds `amount` to the card's balance.
    pub async fn reload_gift_card(
        &self,
        card_number: &str,
        amount: Money,
        now: DateTime<Utc>,
    ) -> DbResult<GiftCard> {
        let id = self.require_id(card_number)?;
        let (card, ()) = self
            .cards
            .update_with(&id, |card| {
                gift_card::reload(card, amount, now)?;
                Ok(())
            })
            .await?;
        info!(card_number = %card_number, amount = %amount, "Gift card reloaded");
        Ok(card)
    }

    /// Balance of the card, zero for unknown numbers.
    pub fn gift_card_balance(&self, card_number: &str) -> Money {
        self.by_number(card_number)
            .map_or(Money::zero(), |c| Money::from_cents(c.balance_cents))
    }

    fn require_id(&self, card_number: &str) -> DbResult<String> {
        self.by_number(card_number)
            .map(|c| c.id)
            .ok_or_else(|| CoreError::GiftCardNotFound(card_number.to_string()).into())
    }
}

fn default_gift_cards(now: DateTime<Utc>) -> Vec<GiftCard> {
    let mut card = GiftCard::new(10_000, utc_date(2025, 12, 31), now);
    card.id = "gc-001".into();
    card.card_number = "****1234".into();
    card.balance_cents = 5_000;
    card.issued_date = utc_date(2024, 1, 1).unwrap_or(now);
    card.usage_history.push(GiftCardTransaction {
        id: "gct-001".into(),
        gift_card_id: card.id.clone(),
        amount_cents: 5_000,
        kind: GiftCardTransactionKind::Redemption,
        transaction_id: None,
        date: now,
        notes: Some("Used in transaction".into()),
    });
    vec![card]
}

// =============================================================================
// Vouchers
// =============================================================================

#[derive(Clone)]
pub struct VoucherStore {
    vouchers: CollectionStore<Voucher>,
}

impl VoucherStore {
    pub(crate) async fn open(storage: LocalStorage) -> DbResult<Self> {
        let vouchers =
            CollectionStore::open_seeded(storage, keys::VOUCHERS, "Voucher", default_vouchers)
                .await?;
        Ok(VoucherStore { vouchers })
    }

    pub fn vouchers(&self) -> &CollectionStore<Voucher> {
        &self.vouchers
    }

    pub fn by_code(&self, code: &str) -> Option<Voucher> {
        self.vouchers.find(|v| v.code == code)
    }

    /// Issues a voucher with a generated `VOUCH…` code.
    pub async fn create_voucher(
        &self,
        value: i64,
        voucher_type: VoucherType,
        max_uses: u32,
        expiry_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DbResult<Voucher> {
        let voucher = self
            .vouchers
            .add(Voucher::new(value, voucher_type, max_uses, expiry_date, now))
            .await?;
        info!(code = %voucher.code, "Voucher issued");
        Ok(voucher)
    }

    /// The voucher with `code` if it can be used on this order right now.
    pub fn validate_voucher(&self, code: &str, order_amount: Money, now: DateTime<Utc>) -> Option<Voucher> {
        validate_voucher(&self.vouchers.list(), code, order_amount, now).cloned()
    }

    /// Counts one use of `code` by `customer_id`.
    ///
    /// Only the active flag and the remaining uses are checked here; the
    /// expiry date and order minimum belong to [`validate_voucher`](Self::validate_voucher).
    pub async fn redeem_voucher(&self, code: &str, customer_id: &str) -> DbResult<Voucher> {
        let voucher = self
            .vouchers
            .find(|v| v.code == code && v.is_active && v.has_uses_left())
            .ok_or_else(|| CoreError::InvalidVoucher(code.to_string()))?;

        let customer_id = customer_id.to_string();
        let (voucher, ()) = self
            .vouchers
            .update_with(&voucher.id, |v| {
                v.usage_count += 1;
                v.redeemed_by.push(customer_id);
                Ok(())
            })
            .await?;
        info!(code = %code, uses = voucher.usage_count, "Voucher redeemed");
        Ok(voucher)
    }

    /// Discount voucher `id` gives on `amount`; zero for unknown ids.
    pub fn calculate_voucher_discount(&self, id: &str, amount: Money) -> Money {
        self.vouchers
            .get(id)
            .map_or(Money::zero(), |v| voucher_discount(&v, amount))
    }
}

fn default_vouchers(now: DateTime<Utc>) -> Vec<Voucher> {
    let mut welcome = Voucher::new(10, VoucherType::Percentage, 100, utc_date(2025, 12, 31), now);
    welcome.id = "vouch-001".into();
    welcome.code = "WELCOME10".into();
    welcome.usage_count = 25;
    welcome.min_order_cents = Some(2_500);
    vec![welcome]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use chrono::Duration;

    #[tokio::test]
    async fn test_gift_card_lifecycle() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let store = db.gift_cards();

        let card = store
            .create_gift_card(Money::from_cents(10_000), None, now)
            .await
            .unwrap();
        assert_ne!(card.card_number, "****1234");

        store
            .redeem_gift_card(&card.card_number, Money::from_cents(3_000), Some("t-1".into()), now)
            .await
            .unwrap();
        let card = store
            .reload_gift_card(&card.card_number, Money::from_cents(2_000), now)
            .await
            .unwrap();

        assert_eq!(card.balance_cents, 9_000);
        assert_eq!(card.usage_history.len(), 2);
        assert_eq!(store.gift_card_balance(&card.card_number).cents(), 9_000);
        assert!(store.gift_card_balance("****0000x").is_zero());
    }

    #[tokio::test]
    async fn test_redeem_more_than_balance_fails_without_writing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let store = db.gift_cards();
        let card = store
            .create_gift_card(Money::from_cents(1_000), Some(now + Duration::days(30)), now)
            .await
            .unwrap();

        let err = store
            .redeem_gift_card(&card.card_number, Money::from_cents(1_001), None, now)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InsufficientGiftCardBalance { .. })
        ));
        assert_eq!(store.gift_card_balance(&card.card_number).cents(), 1_000);

        let err = store
            .redeem_gift_card("****nope", Money::from_cents(1), None, now)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::GiftCardNotFound(_))));
    }

    #[tokio::test]
    async fn test_voucher_validation_and_redemption() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let store = db.vouchers();

        let voucher = store
            .create_voucher(500, VoucherType::Fixed, 1, Some(now + Duration::days(7)), now)
            .await
            .unwrap();
        assert!(voucher.code.starts_with("VOUCH"));

        assert!(store.validate_voucher(&voucher.code, Money::from_cents(100), now).is_some());
        assert!(store
            .validate_voucher(&voucher.code, Money::from_cents(100), now + Duration::days(8))
            .is_none());
        // fixed vouchers never exceed the order
        assert_eq!(
            store.calculate_voucher_discount(&voucher.id, Money::from_cents(300)).cents(),
            300
        );

        let redeemed = store.redeem_voucher(&voucher.code, "c-1").await.unwrap();
        assert_eq!(redeemed.redeemed_by, vec!["c-1"]);

        let err = store.redeem_voucher(&voucher.code, "c-2").await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidVoucher(_))));
    }
}
