//! # API Error Type
//!
//! Unified error type for admin commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command Function  ─► Result<T, ApiError>                              │
//! │         │                                                               │
//! │         ├── DbError::QueryFailed("...")    ──► DATABASE_ERROR           │
//! │         │     (details logged, generic message returned)                │
//! │         ├── DbError::NotFound              ──► NOT_FOUND                │
//! │         ├── CoreError::InsufficientStock   ──► INSUFFICIENT_STOCK       │
//! │         ├── CoreError::InvalidVoucher      ──► BUSINESS_LOGIC           │
//! │         └── ValidationError                ──► VALIDATION_ERROR         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Callers get both a machine-readable `code` and a message to display:
//! ```json
//! { "code": "NOT_FOUND", "message": "Product not found: p-123" }
//! ```

use serde::Serialize;
use till_core::CoreError;
use till_db::DbError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Storage failed; the details are in the log
    DatabaseError,

    /// A business rule refused the operation
    BusinessLogic,

    Internal,

    CartError,

    InsufficientStock,

    PaymentError,

    /// The backup file was rejected
    InvalidBackup,

    /// Wrong credentials or nobody signed in
    Unauthorized,

    /// Signed in, but the role is not enough
    Forbidden,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Serialization failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Could not save data")
            }
            DbError::InvalidBackup => {
                ApiError::new(ErrorCode::InvalidBackup, "Invalid backup file format")
            }
            DbError::Core(e) => ApiError::from(e),
            DbError::Credentials(e) => {
                tracing::error!("Credential handling failed: {}", e);
                ApiError::internal("Credential handling failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::NotFound { entity, id } => ApiError::not_found(entity, &id),
            CoreError::GiftCardNotFound(number) => ApiError::not_found("Gift card", &number),
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, message)
            }
            CoreError::EmptyCart => ApiError::cart(message),
            CoreError::InsufficientPayment { .. } => ApiError::new(ErrorCode::PaymentError, message),
            CoreError::InvalidReturnTransition { .. }
            | CoreError::GiftCardInactive(_)
            | CoreError::GiftCardExpired(_)
            | CoreError::InsufficientGiftCardBalance { .. }
            | CoreError::InvalidVoucher(_)
            | CoreError::NoOpenShift(_) => ApiError::new(ErrorCode::BusinessLogic, message),
            CoreError::Csv { .. } | CoreError::Validation(_) => ApiError::validation(message),
            CoreError::InvalidBackup => ApiError::new(ErrorCode::InvalidBackup, message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
