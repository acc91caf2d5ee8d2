//! # Validation Module
//!
//! Input checks run by the admin commands before anything is written.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command input                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  THIS MODULE: shape of the input (required, positive, percent range)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Domain functions: business rules (stock floor, card balance, ...)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Stores: persist whatever they are given                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stores never validate. Bulk paths that must accept whatever the user
//! typed (CSV import, restore) skip this module entirely.

use crate::error::ValidationError;

pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_SKU_LEN: usize = 50;

/// Most units of one product on a single cart line.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Most units moved by one manual stock adjustment or restock record.
pub const MAX_STOCK_MOVEMENT: i64 = 100_000;

/// Most loyalty points added or redeemed in one operation.
pub const MAX_POINTS_CHANGE: i64 = 1_000_000;

// =============================================================================
// String Validators
// =============================================================================

/// Rejects empty or whitespace-only values.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Names of products, customers, categories, discounts...
///
/// ```rust
/// use till_core::validation::validate_name;
///
/// assert!(validate_name("name", "Sparkling Water").is_ok());
/// assert!(validate_name("name", "  ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    validate_required(field, name)?;
    if name.trim().chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// Letters, digits, hyphens and underscores; at most 50 characters.
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();
    validate_required("sku", sku)?;

    if sku.len() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// A loose shape check: one `@` with something on both sides and a dot in
/// the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    validate_required("email", email)?;

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Quantities entered by hand: stock adjustments, restocks, loyalty points.
pub fn validate_positive(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Positive and at most `max`.
pub fn validate_bounded(field: &str, value: i64, max: i64) -> ValidationResult<()> {
    validate_positive(field, value)?;
    if value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max,
        });
    }
    Ok(())
}

/// A cart line quantity.
///
/// ```text
/// qty <= 0   → "quantity must be positive"
/// qty > 999  → "quantity must be between 1 and 999"
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    validate_bounded("quantity", qty, MAX_ITEM_QUANTITY)
}

/// Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Whole percent between 0 and 100.
pub fn validate_percent(field: &str, percent: i64) -> ValidationResult<()> {
    if !(0..=100).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("COKE-330").is_ok());
        assert!(validate_sku("product_1").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Coca-Cola 330ml").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("admin@pos.local").is_ok());
        assert!(validate_email("jane.doe@shop.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@pos.local").is_err());
        assert!(validate_email("a@localhost").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_numeric_validators() {
        assert!(validate_positive("quantity", 1).is_ok());
        assert!(validate_positive("quantity", 0).is_err());
        assert!(validate_positive("quantity", -4).is_err());

        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(MAX_ITEM_QUANTITY + 1),
            Err(ValidationError::OutOfRange { max: MAX_ITEM_QUANTITY, .. })
        ));
        assert!(validate_bounded("points", i64::MAX, MAX_POINTS_CHANGE).is_err());
        assert!(validate_bounded("points", 0, MAX_POINTS_CHANGE).is_err());

        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());

        assert!(validate_percent("value", 100).is_ok());
        assert!(validate_percent("value", 101).is_err());
        assert!(validate_percent("value", -1).is_err());
    }
}
