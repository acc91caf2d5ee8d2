//! # Error Types
//!
//! Domain errors for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core (this file)                                                 │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Malformed input                                │
//! │                                                                         │
//! │  till-db                                                               │
//! │  └── DbError          - Storage and serialization failures             │
//! │                                                                         │
//! │  apps/admin                                                            │
//! │  └── ApiError         - Serializable code + message for callers        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Variants carry the identifying context (SKU, card number, code) so the
//! message can be shown as-is.

use thiserror::Error;

use crate::money::Money;
use crate::types::ReturnStatus;

// =============================================================================
// Core Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CoreError {
    /// A record looked up by id does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A stock change would leave a negative quantity.
    ///
    /// ```text
    /// Remove 5 from "COKE" (on hand: 3)
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "COKE", available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    #[error("Cart is empty")]
    EmptyCart,

    /// Cash or digital payment smaller than the total.
    #[error("Insufficient payment: total {total}, tendered {tendered}")]
    InsufficientPayment { total: Money, tendered: Money },

    /// Only pending → approved/rejected/cancelled and approved → completed
    /// are allowed.
    #[error("Return {return_id} cannot move from {} to {}", .from.as_str(), .to.as_str())]
    InvalidReturnTransition {
        return_id: String,
        from: ReturnStatus,
        to: ReturnStatus,
    },

    #[error("Gift card not found: {0}")]
    GiftCardNotFound(String),

    #[error("Gift card {0} is not active")]
    GiftCardInactive(String),

    #[error("Gift card {0} has expired")]
    GiftCardExpired(String),

    #[error("Gift card {card_number} balance {balance} is less than {requested}")]
    InsufficientGiftCardBalance {
        card_number: String,
        balance: Money,
        requested: Money,
    },

    /// Unknown, inactive, used up, expired, or the order is below the
    /// voucher's minimum.
    #[error("Voucher {0} is not valid for this order")]
    InvalidVoucher(String),

    /// A shift operation found no matching open shift.
    #[error("No open shift for employee {0}")]
    NoOpenShift(String),

    #[error("CSV line {line}: {reason}")]
    Csv { line: usize, reason: String },

    #[error("Invalid backup file format")]
    InvalidBackup,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Text that does not parse as a currency amount.
    #[error("'{value}' is not a valid amount")]
    InvalidAmount { value: String },

    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;
