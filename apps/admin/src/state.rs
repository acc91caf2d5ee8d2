//! # Cart State
//!
//! The sale in progress. The cart is not persisted: it lives for as long
//! as the process and is cleared by checkout.
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_to_cart ──────┐                                                    │
//! │  update_cart_item ─┼──► CartState (Arc<Mutex<Cart>>) ──► till_core::Cart│
//! │  checkout ─────────┘        one command at a time                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The lock is never held across an `.await`: commands copy what they need
//! out of the cart, release it, and then talk to the stores.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use till_core::cart::Cart;

#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        CartState::default()
    }

    /// Runs `f` with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        f(&self.lock())
    }

    /// Runs `f` with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        f(&mut self.lock())
    }

    /// Poisoning is ignored: every `Cart` method leaves a consistent cart.
    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use till_core::Product;

    #[test]
    fn test_clones_share_the_cart() {
        let state = CartState::new();
        let other = state.clone();
        let tea = Product::new("Tea", "TEA", 250, Utc::now());

        other.with_cart_mut(|cart| cart.add_product(&tea)).unwrap();
        other.with_cart_mut(|cart| cart.add_product(&tea)).unwrap();

        assert_eq!(state.with_cart(|cart| cart.total_quantity()), 2);
        assert_eq!(state.with_cart(|cart| cart.subtotal().cents()), 500);
    }
}
