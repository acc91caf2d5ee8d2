//! # till-core: Pure Business Logic for the Till Back Office
//!
//! Everything the back office computes, with no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Till Back Office Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              apps/admin (commands + till-admin CLI)             │   │
//! │  │   checkout, adjust_stock, manage_points, import_products, ...   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   types      money      cart       discount    gift_card        │   │
//! │  │   loyalty    returns    inventory  shift       csv              │   │
//! │  │   analytics  customer_analytics    backup      validation       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • "now" IS ALWAYS A PARAMETER             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                till-db (local storage + stores)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity records and their partial-update patches
//! - [`money`] - Integer-cent money
//! - [`cart`] - Cart lines and checkout totals (fixed 7% tax)
//! - [`discount`] - Discount and voucher amounts
//! - [`gift_card`] - Gift card redemption and reload
//! - [`loyalty`] - Points balance rules and reward tiers
//! - [`returns`] - Refund amounts and the return status machine
//! - [`inventory`] - Stock movements, reorder suggestions, valuation
//! - [`shift`] - Clock in/out, breaks, hours worked
//! - [`csv`] - Product and customer CSV exchange
//! - [`analytics`] / [`customer_analytics`] - Reports
//! - [`backup`] - Backup document format
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use till_core::cart::Cart;
//! use till_core::{Money, Product};
//!
//! let mut cart = Cart::new();
//! cart.add_product(&Product::new("Coffee", "COF-1", 1000, Utc::now()));
//!
//! let totals = cart.totals(Money::zero());
//! assert_eq!(totals.tax_cents, 70);
//! assert_eq!(totals.total_cents, 1070);
//! ```

pub mod error;
pub mod money;
pub mod types;

pub mod analytics;
pub mod backup;
pub mod cart;
pub mod csv;
pub mod customer_analytics;
pub mod discount;
pub mod gift_card;
pub mod inventory;
pub mod loyalty;
pub mod returns;
pub mod shift;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
