//! # Cart & Checkout Commands
//!
//! ## Checkout Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. snapshot the cart          (EmptyCart if none)                      │
//! │  2. discount + voucher         (discount store, voucher store)          │
//! │  3. totals, change due         (InsufficientPayment for cash/digital)   │
//! │  ─────────────────────────────── nothing written above this line ────── │
//! │  4. transactions.add           (status completed, TXN<millis>)          │
//! │  5. cart.clear                                                          │
//! │  6. products: quantity -= qty  (unchecked, may go negative)             │
//! │     inventoryLogs: one `sale` entry per line                            │
//! │  7. customer: total_spent += total, loyalty_points += earned            │
//! │  8. discount usage, voucher redemption                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Steps 4-8 are separate store writes. A failure part-way is returned to
//! the caller with the earlier writes kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use till_core::cart::{change_due, Cart, CartTotals};
use till_core::{
    inventory, loyalty, new_id, transaction_number, CartItem, CoreError, Money, PaymentMethod,
    Transaction, TransactionStatus,
};
use till_db::Database;

use crate::error::ApiError;
use crate::state::CartState;

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

pub fn get_cart(cart: &CartState) -> CartView {
    cart.with_cart(|c| CartView {
        items: c.items.clone(),
        totals: c.totals(Money::zero()),
    })
}

/// Adds one unit of an active product.
pub fn add_to_cart(db: &Database, cart: &CartState, product_id: &str) -> Result<CartView, ApiError> {
    let product = db.products().require(product_id)?;
    if !product.active {
        return Err(ApiError::cart(format!("{} is not for sale", product.name)));
    }
    debug!(product = %product.sku, "add_to_cart");
    cart.with_cart_mut(|c| c.add_product(&product))?;
    Ok(get_cart(cart))
}

/// Sets a line's quantity; zero or less removes it.
pub fn update_cart_item(
    cart: &CartState,
    product_id: &str,
    quantity: i64,
) -> Result<CartView, ApiError> {
    cart.with_cart_mut(|c| c.update_quantity(product_id, quantity))?;
    Ok(get_cart(cart))
}

pub fn remove_from_cart(cart: &CartState, product_id: &str) -> CartView {
    cart.with_cart_mut(|c| c.remove(product_id));
    get_cart(cart)
}

pub fn clear_cart(cart: &CartState) {
    cart.with_cart_mut(|c| c.clear());
}

// =============================================================================
// Checkout
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment_method: Option<PaymentMethod>,
    /// Amount handed over, for cash and digital payments.
    pub tendered_cents: Option<i64>,
    pub customer_id: Option<String>,
    pub discount_id: Option<String>,
    pub voucher_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub store_name: String,
    pub header: String,
    pub footer: String,
    pub transaction: Transaction,
    pub change_cents: i64,
    pub points_earned: i64,
}

/// Turns the cart into a completed sale.
pub async fn checkout(
    db: &Database,
    cart: &CartState,
    request: CheckoutRequest,
    now: DateTime<Utc>,
) -> Result<Receipt, ApiError> {
    // one snapshot: the recorded lines and totals come from the same cart
    let sale = cart.with_cart(Cart::clone);
    if sale.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }
    let method = request.payment_method.unwrap_or(PaymentMethod::Cash);

    let subtotal = sale.subtotal();
    let discount = order_discount(db, &request, &sale.items, subtotal, now)?;
    let totals = sale.totals(discount);
    let items = sale.items;
    let change = change_due(
        totals.total(),
        method,
        request.tendered_cents.map(Money::from_cents),
    )?;

    let transaction = db
        .transactions()
        .add(Transaction {
            id: new_id(),
            transaction_number: transaction_number(now),
            customer_id: request.customer_id.clone(),
            items: items.clone(),
            subtotal_cents: totals.subtotal_cents,
            tax_cents: totals.tax_cents,
            discount_cents: totals.discount_cents,
            total_cents: totals.total_cents,
            payment_method: method,
            status: TransactionStatus::Completed,
            notes: request.notes.clone(),
            created_at: now,
            updated_at: now,
        })
        .await?;
    cart.with_cart_mut(|c| c.clear());

    take_stock(db, &items, &transaction.transaction_number, now).await?;
    let points_earned = credit_customer(db, request.customer_id.as_deref(), totals.total()).await?;

    if let Some(id) = request.discount_id.as_deref() {
        db.discounts().record_usage(id).await?;
    }
    if let Some(code) = request.voucher_code.as_deref() {
        let customer = request.customer_id.as_deref().unwrap_or("walk-in");
        db.vouchers().redeem_voucher(code, customer).await?;
    }

    info!(
        transaction = %transaction.transaction_number,
        total = %transaction.total(),
        items = items.len(),
        method = ?method,
        "Sale completed"
    );

    let settings = db.settings().get();
    Ok(Receipt {
        store_name: settings.store_name,
        header: settings.receipt_header,
        footer: settings.receipt_footer,
        transaction,
        change_cents: change.cents(),
        points_earned,
    })
}

/// Discount plus voucher, never more than the subtotal.
fn order_discount(
    db: &Database,
    request: &CheckoutRequest,
    items: &[CartItem],
    subtotal: Money,
    now: DateTime<Utc>,
) -> Result<Money, ApiError> {
    let mut discount = Money::zero();

    if let Some(id) = request.discount_id.as_deref() {
        let usable = db.discounts().active(now).iter().any(|d| d.id == id);
        if !usable {
            return Err(ApiError::validation(format!("Discount {} is not available", id)));
        }
        discount += db.discounts().calculate_for_cart(id, items);
    }

    if let Some(code) = request.voucher_code.as_deref() {
        let voucher = db
            .vouchers()
            .validate_voucher(code, subtotal, now)
            .ok_or_else(|| CoreError::InvalidVoucher(code.to_string()))?;
        discount += db.vouchers().calculate_voucher_discount(&voucher.id, subtotal);
    }

    Ok(discount.min(subtotal))
}

/// Decrements stock for every line and logs the sales.
async fn take_stock(
    db: &Database,
    items: &[CartItem],
    transaction_number: &str,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    let logs = db
        .products()
        .modify(|products| {
            let mut logs = Vec::with_capacity(items.len());
            for item in items {
                match products.iter_mut().find(|p| p.id == item.product_id) {
                    Some(product) => logs.push(inventory::record_sale(
                        product,
                        item.quantity,
                        transaction_number,
                        now,
                    )),
                    None => warn!(product = %item.product_id, "Sold product no longer in catalog"),
                }
            }
            Ok(logs)
        })
        .await?;
    db.inventory_logs().append(logs).await?;
    Ok(())
}

/// Credits spend and loyalty points. Returns the points earned.
async fn credit_customer(
    db: &Database,
    customer_id: Option<&str>,
    total: Money,
) -> Result<i64, ApiError> {
    let Some(id) = customer_id else {
        return Ok(0);
    };
    if db.customers().get(id).is_none() {
        warn!(customer = %id, "Sale for unknown customer; no points credited");
        return Ok(0);
    }

    let per_unit = db.settings().get().loyalty_points_per_unit;
    let points = loyalty::points_for_purchase(total, per_unit);
    db.customers()
        .update_with(id, |customer| {
            customer.total_spent_cents = customer.total_spent_cents.saturating_add(total.cents());
            customer.loyalty_points = customer.loyalty_points.saturating_add(points);
            Ok(())
        })
        .await?;
    Ok(points)
}
