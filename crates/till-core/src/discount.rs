//! # Discounts and Vouchers
//!
//! How much a discount or voucher takes off an order.
//!
//! ## Discount Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  inactive                        → 0                                    │
//! │  amount < min_order              → 0                                    │
//! │  percentage   amount × value%                                           │
//! │  fixed        value (never more than the amount)                        │
//! │  conditional  amount × value%, only when a min_order is set             │
//! │  bogo         per line: ⌊qty / (buy + get)⌋ × get units at get_percent% │
//! │  then         min(result, max_discount)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Percentages round to the nearest cent.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::{CartItem, Discount, DiscountType, Voucher, VoucherType};

// =============================================================================
// Discounts
// =============================================================================

/// Discounts that can be applied right now.
pub fn active_discounts(discounts: &[Discount], now: DateTime<Utc>) -> Vec<&Discount> {
    discounts.iter().filter(|d| d.is_live(now)).collect()
}

/// Live discounts that cover `product_id`.
pub fn discounts_for_product<'a>(
    discounts: &'a [Discount],
    product_id: &str,
    now: DateTime<Utc>,
) -> Vec<&'a Discount> {
    discounts
        .iter()
        .filter(|d| d.is_live(now) && d.applies_to_product(product_id))
        .collect()
}

/// Discount on an order amount.
///
/// BOGO discounts depend on the individual lines and yield zero here; use
/// [`cart_discount`] for those.
pub fn calculate_discount(discount: &Discount, amount: Money) -> Money {
    if !discount.is_active || below_minimum(discount, amount) {
        return Money::zero();
    }

    let raw = match discount.discount_type {
        DiscountType::Percentage => amount.percent(percent_value(discount.value)),
        DiscountType::Fixed => Money::from_cents(discount.value.max(0)).min(amount),
        DiscountType::Conditional if discount.min_order_cents.is_some() => {
            amount.percent(percent_value(discount.value))
        }
        DiscountType::Conditional | DiscountType::Bogo => Money::zero(),
    };

    apply_cap(discount, raw)
}

/// Discount for a whole cart: BOGO works line by line, everything else on
/// the subtotal.
pub fn cart_discount(discount: &Discount, items: &[CartItem]) -> Money {
    let subtotal: Money = items.iter().map(CartItem::line_total).sum();
    match discount.discount_type {
        DiscountType::Bogo => {
            if !discount.is_active || below_minimum(discount, subtotal) {
                return Money::zero();
            }
            apply_cap(discount, bogo_discount(discount, items))
        }
        _ => calculate_discount(discount, subtotal),
    }
}

/// Free (or reduced) units across the lines a BOGO discount covers.
fn bogo_discount(discount: &Discount, items: &[CartItem]) -> Money {
    let Some(rule) = discount.bogo else {
        return Money::zero();
    };

    let group = rule.buy_quantity() + rule.get_quantity();
    if group <= 0 || rule.get_quantity() == 0 {
        return Money::zero();
    }

    items
        .iter()
        .filter(|item| covers_line(discount, item))
        .map(|item| {
            let discounted_units = (item.quantity / group) * rule.get_quantity();
            item.product
                .price()
                .multiply_quantity(discounted_units)
                .percent(rule.get_percent.min(100))
        })
        .sum()
}

fn covers_line(discount: &Discount, item: &CartItem) -> bool {
    let category_ok = discount.applicable_categories.is_empty()
        || discount
            .applicable_categories
            .iter()
            .any(|c| *c == item.product.category_id);
    discount.applies_to_product(&item.product_id) && category_ok
}

fn below_minimum(discount: &Discount, amount: Money) -> bool {
    discount
        .min_order_cents
        .map_or(false, |min| amount.cents() < min)
}

fn apply_cap(discount: &Discount, amount: Money) -> Money {
    match discount.max_discount_cents {
        Some(max) => amount.min(Money::from_cents(max)),
        None => amount,
    }
}

fn percent_value(value: i64) -> u32 {
    value.clamp(0, 100) as u32
}

// =============================================================================
// Vouchers
// =============================================================================

/// Whether `voucher` can be redeemed on an order of `order_amount` at `now`.
pub fn voucher_is_valid(voucher: &Voucher, order_amount: Money, now: DateTime<Utc>) -> bool {
    voucher.is_active
        && voucher.has_uses_left()
        && voucher.expiry_date.map_or(true, |expiry| expiry > now)
        && voucher
            .min_order_cents
            .map_or(true, |min| order_amount.cents() >= min)
}

/// Finds the voucher with `code` that is valid for this order.
pub fn validate_voucher<'a>(
    vouchers: &'a [Voucher],
    code: &str,
    order_amount: Money,
    now: DateTime<Utc>,
) -> Option<&'a Voucher> {
    vouchers
        .iter()
        .find(|v| v.code == code && voucher_is_valid(v, order_amount, now))
}

/// Percentage vouchers take `value`% of the amount; fixed vouchers take
/// `value` but never more than the amount.
pub fn voucher_discount(voucher: &Voucher, amount: Money) -> Money {
    match voucher.voucher_type {
        VoucherType::Percentage => amount.percent(percent_value(voucher.value)),
        VoucherType::Fixed => Money::from_cents(voucher.value.max(0)).min(amount),
    }
}
