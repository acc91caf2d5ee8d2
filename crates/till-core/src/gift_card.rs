//! Gift card redemption and reload.
//!
//! Both operations mutate the card in place and append to its usage history.
//! A failed redemption leaves the card untouched.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{new_id, GiftCard, GiftCardTransaction, GiftCardTransactionKind};
use crate::validation::validate_positive;

/// Takes `amount` off the card's balance.
///
/// Fails when the card is inactive, expired, or holds less than `amount`.
pub fn redeem(
    card: &mut GiftCard,
    amount: Money,
    transaction_id: Option<String>,
    now: DateTime<Utc>,
) -> CoreResult<()> {
    validate_positive("amount", amount.cents())?;

    if !card.is_active {
        return Err(CoreError::GiftCardInactive(card.card_number.clone()));
    }
    if card.is_expired(now) {
        return Err(CoreError::GiftCardExpired(card.card_number.clone()));
    }
    if card.balance_cents < amount.cents() {
        return Err(CoreError::InsufficientGiftCardBalance {
            card_number: card.card_number.clone(),
            balance: Money::from_cents(card.balance_cents),
            requested: amount,
        });
    }

    card.balance_cents -= amount.cents();
    push_history(card, GiftCardTransactionKind::Redemption, amount, transaction_id, now);
    Ok(())
}

/// Adds `amount` to the card's balance.
pub fn reload(card: &mut GiftCard, amount: Money, now: DateTime<Utc>) -> CoreResult<()> {
    validate_positive("amount", amount.cents())?;

    card.balance_cents += amount.cents();
    push_history(card, GiftCardTransactionKind::Reload, amount, None, now);
    Ok(())
}

fn push_history(
    card: &mut GiftCard,
    kind: GiftCardTransactionKind,
    amount: Money,
    transaction_id: Option<String>,
    now: DateTime<Utc>,
) {
    card.usage_history.push(GiftCardTransaction {
        id: new_id(),
        gift_card_id: card.id.clone(),
        amount_cents: amount.cents(),
        kind,
        transaction_id,
        date: now,
        notes: None,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn card(balance_cents: i64) -> GiftCard {
        GiftCard::new(balance_cents, None, Utc::now())
    }

    #[test]
    fn test_redeem_reduces_balance_and_records_history() {
        let mut gc = card(5000);
        redeem(&mut gc, Money::from_cents(1250), Some("txn-1".into()), Utc::now()).unwrap();

        assert_eq!(gc.balance_cents, 3750);
        assert_eq!(gc.original_amount_cents, 5000);
        assert_eq!(gc.usage_history.len(), 1);
        assert_eq!(gc.usage_history[0].kind, GiftCardTransactionKind::Redemption);
        assert_eq!(gc.usage_history[0].transaction_id.as_deref(), Some("txn-1"));
    }

    #[test]
    fn test_redeem_insufficient_balance_leaves_card_untouched() {
        let mut gc = card(1000);
        let before = gc.clone();
        let err = redeem(&mut gc, Money::from_cents(1001), None, Utc::now()).unwrap_err();

        assert!(matches!(err, CoreError::InsufficientGiftCardBalance { .. }));
        assert_eq!(gc, before);
    }

    #[test]
    fn test_redeem_rejects_inactive_and_expired() {
        let now = Utc::now();
        let mut inactive = card(1000);
        inactive.is_active = false;
        assert!(matches!(
            redeem(&mut inactive, Money::from_cents(100), None, now),
            Err(CoreError::GiftCardInactive(_))
        ));

        let mut expired = card(1000);
        expired.expiry_date = Some(now - Duration::days(1));
        assert!(matches!(
            redeem(&mut expired, Money::from_cents(100), None, now),
            Err(CoreError::GiftCardExpired(_))
        ));
    }

    #[test]
    fn test_reload_appends_history() {
        let mut gc = card(0);
        reload(&mut gc, Money::from_cents(2500), Utc::now()).unwrap();
        assert_eq!(gc.balance_cents, 2500);
        assert_eq!(gc.usage_history[0].kind, GiftCardTransactionKind::Reload);
        assert!(reload(&mut gc, Money::zero(), Utc::now()).is_err());
    }
}
