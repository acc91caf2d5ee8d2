//! # Cart
//!
//! The sale being rung up, and the totals shown at checkout.
//!
//! ## Totals
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal = Σ price × quantity                                          │
//! │  tax      = round(subtotal × 7%)        (half up, to the cent)          │
//! │  total    = subtotal + tax − discount                                   │
//! │                                                                         │
//! │  Tax is computed on the whole subtotal, not per line, so the cart       │
//! │  total always equals the line totals plus exactly one rounding step.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The 7% rate is fixed. The store settings carry a tax rate too, but it is
//! only printed on reports.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartItem, PaymentMethod, Product, TaxRate};
use crate::validation::validate_quantity;

/// Tax charged on every cart.
pub const CART_TAX_RATE: TaxRate = TaxRate::from_bps(700);

// =============================================================================
// Cart
// =============================================================================

/// Lines are unique by product id and always hold between 1 and
/// [`MAX_ITEM_QUANTITY`](crate::validation::MAX_ITEM_QUANTITY) units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds one unit of `product`, or bumps the existing line by one.
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(item) => {
                validate_quantity(item.quantity + 1)?;
                item.quantity += 1;
            }
            None => self.items.push(CartItem::new(product.clone(), 1)),
        }
        Ok(())
    }

    /// Removes the line for `product_id`. Unknown ids are ignored.
    pub fn remove(&mut self, product_id: &str) {
        self.items.retain(|i| i.product_id != product_id);
    }

    /// Sets a line's quantity. Zero or less removes the line; more than
    /// the line maximum is refused and the cart is left as it was.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove(product_id);
            return Ok(());
        }
        validate_quantity(quantity)?;
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn tax(&self) -> Money {
        self.subtotal().calculate_tax(CART_TAX_RATE)
    }

    /// Totals with an order-level discount applied after tax.
    pub fn totals(&self, discount: Money) -> CartTotals {
        let subtotal = self.subtotal();
        let tax = subtotal.calculate_tax(CART_TAX_RATE);
        CartTotals {
            item_count: self.items.len(),
            total_quantity: self.total_quantity(),
            subtotal_cents: subtotal.cents(),
            tax_cents: tax.cents(),
            discount_cents: discount.cents(),
            total_cents: (subtotal + tax - discount).cents(),
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl CartTotals {
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Change owed for a payment.
///
/// Cash and digital payments need a tendered amount at least equal to the
/// total. Card and check payments are taken for the exact total.
pub fn change_due(
    total: Money,
    method: PaymentMethod,
    tendered: Option<Money>,
) -> CoreResult<Money> {
    if !method.requires_tender() {
        return Ok(Money::zero());
    }

    let tendered = tendered.unwrap_or_default();
    if tendered < total {
        return Err(CoreError::InsufficientPayment { total, tendered });
    }
    Ok(tendered - total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::validation::MAX_ITEM_QUANTITY;
    use chrono::Utc;

    fn product(name: &str, price_cents: i64) -> Product {
        Product::new(name, name.to_uppercase(), price_cents, Utc::now())
    }

    #[test]
    fn test_add_existing_product_increments_line() {
        let mut cart = Cart::new();
        let cola = product("cola", 199);
        cart.add_product(&cola).unwrap();
        cart.add_product(&cola).unwrap();
        cart.add_product(&product("chips", 250)).unwrap();

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        let cola = product("cola", 199);
        cart.add_product(&cola).unwrap();
        cart.update_quantity(&cola.id, 4).unwrap();
        assert_eq!(cart.items[0].quantity, 4);

        cart.update_quantity(&cola.id, 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_line_quantity_is_capped() {
        let mut cart = Cart::new();
        let cola = product("cola", 199);
        cart.add_product(&cola).unwrap();
        cart.update_quantity(&cola.id, MAX_ITEM_QUANTITY).unwrap();

        assert!(matches!(
            cart.add_product(&cola),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(cart.update_quantity(&cola.id, i64::MAX).is_err());
        assert_eq!(cart.items[0].quantity, MAX_ITEM_QUANTITY);
    }

    #[test]
    fn test_totals_are_lines_plus_seven_percent() {
        let mut cart = Cart::new();
        let cola = product("cola", 199);
        let chips = product("chips", 350);
        cart.add_product(&cola).unwrap();
        cart.update_quantity(&cola.id, 3).unwrap();
        cart.add_product(&chips).unwrap();

        let line_sum: i64 = cart.items.iter().map(|i| i.line_total().cents()).sum();
        let totals = cart.totals(Money::zero());

        // 597 + 350 = 947; 947 × 7% = 66.29 → 66
        assert_eq!(totals.subtotal_cents, line_sum);
        assert_eq!(totals.subtotal_cents, 947);
        assert_eq!(totals.tax_cents, 66);
        assert_eq!(totals.total_cents, 1013);
    }

    #[test]
    fn test_discount_is_subtracted_after_tax() {
        let mut cart = Cart::new();
        cart.add_product(&product("basket", 10_000)).unwrap();
        let totals = cart.totals(Money::from_cents(500));
        assert_eq!(totals.tax_cents, 700);
        assert_eq!(totals.total_cents, 10_200);
    }

    #[test]
    fn test_change_due() {
        let total = Money::from_cents(1070);
        assert_eq!(
            change_due(total, PaymentMethod::Cash, Some(Money::from_cents(2000)))
                .unwrap()
                .cents(),
            930
        );
        assert!(matches!(
            change_due(total, PaymentMethod::Digital, Some(Money::from_cents(1000))),
            Err(CoreError::InsufficientPayment { .. })
        ));
        assert!(change_due(total, PaymentMethod::Card, None).unwrap().is_zero());
    }
}
