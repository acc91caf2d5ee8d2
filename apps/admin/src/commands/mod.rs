//! # Commands Module
//!
//! Back-office workflows. Single-store CRUD goes straight to the stores on
//! [`Database`](till_db::Database); the functions here cover everything
//! that crosses stores or needs the pure rules in `till-core`.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── checkout.rs   ◄─── get_cart, add_to_cart, checkout
//! ├── inventory.rs  ◄─── adjust_stock, reorder_suggestions, stock_valuation
//! ├── loyalty.rs    ◄─── manage_points, loyalty_overview
//! ├── catalog.rs    ◄─── export/import products and customers
//! ├── data.rs       ◄─── export/restore backup, clear_all_data
//! ├── returns.rs    ◄─── approve_return, complete_return
//! ├── staff.rs      ◄─── timesheet
//! ├── auth.rs       ◄─── login, logout, require_role
//! └── analytics.rs  ◄─── dashboard, sales_report, customer_report
//! ```
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  caller (CLI, tests)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  async fn command(db: &Database, ...) -> Result<T, ApiError>            │
//! │       │              │                                                  │
//! │       │              ├── till_core: validate, compute                   │
//! │       │              └── till_db:   read snapshots, commit writes       │
//! │       ▼                                                                 │
//! │  T: Serialize (camelCase)  or  ApiError { code, message }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod data;
pub mod inventory;
pub mod loyalty;
pub mod returns;
pub mod staff;
