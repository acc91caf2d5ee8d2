//! # Returns
//!
//! Refund math and the return status machine.
//!
//! ## Status Machine
//! ```text
//!                 ┌──────────► rejected
//!                 │
//!   pending ──────┼──────────► cancelled
//!                 │
//!                 └──► approved ──► completed
//! ```
//! Any other move is refused with [`CoreError::InvalidReturnTransition`].
//! Setting the current status again is also refused.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{
    ItemCondition, RefundMethod, RefundPolicy, RestockRecord, Return, ReturnItem, ReturnStatus,
    DEFAULT_RESTOCK_FEE_PERCENT,
};

// =============================================================================
// Refunds
// =============================================================================

/// Restock fee to charge: the policy's when one is given.
pub fn restock_fee_percent(policy: Option<&RefundPolicy>) -> u32 {
    policy.map_or(DEFAULT_RESTOCK_FEE_PERCENT, |p| p.restock_fee_percent)
}

/// Σ (price × quantity − restock fee), rounded once to the cent.
pub fn calculate_refund(items: &[ReturnItem], restock_fee_percent: u32) -> Money {
    let gross: Money = items
        .iter()
        .map(|item| Money::from_cents(item.original_price_cents).multiply_quantity(item.quantity))
        .sum();
    gross.percent(100u32.saturating_sub(restock_fee_percent.min(100)))
}

// =============================================================================
// Status Transitions
// =============================================================================

pub fn can_transition(from: ReturnStatus, to: ReturnStatus) -> bool {
    use ReturnStatus::*;
    matches!(
        (from, to),
        (Pending, Approved) | (Pending, Rejected) | (Pending, Cancelled) | (Approved, Completed)
    )
}

/// Moves `ret` to `to`, recording `notes` as the approval notes.
///
/// Completing stamps `completed_at`.
pub fn set_status(
    ret: &mut Return,
    to: ReturnStatus,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> CoreResult<()> {
    if !can_transition(ret.status, to) {
        return Err(CoreError::InvalidReturnTransition {
            return_id: ret.id.clone(),
            from: ret.status,
            to,
        });
    }

    ret.status = to;
    if notes.is_some() {
        ret.approval_notes = notes;
    }
    if to == ReturnStatus::Completed {
        ret.completed_at = Some(now);
    }
    Ok(())
}

pub fn approve(
    ret: &mut Return,
    refund: Money,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> CoreResult<()> {
    set_status(ret, ReturnStatus::Approved, notes, now)?;
    ret.refund_cents = refund.cents();
    Ok(())
}

pub fn complete(ret: &mut Return, method: RefundMethod, now: DateTime<Utc>) -> CoreResult<()> {
    set_status(ret, ReturnStatus::Completed, None, now)?;
    ret.refund_method = method;
    Ok(())
}

// =============================================================================
// Inspection
// =============================================================================

/// Checks a new inspection record against the return.
///
/// The product must be on `ret`, and the units inspected for it so far
/// plus `quantity` may not exceed the units returned.
pub fn validate_inspection(
    ret: &Return,
    records: &[RestockRecord],
    product_id: &str,
    quantity: i64,
) -> CoreResult<()> {
    crate::validation::validate_positive("quantity", quantity)?;

    let returned: i64 = ret
        .items
        .iter()
        .filter(|i| i.product_id == product_id)
        .map(|i| i.quantity.max(0))
        .fold(0, i64::saturating_add);
    if returned == 0 {
        return Err(ValidationError::InvalidFormat {
            field: "product_id".to_string(),
            reason: format!("{} is not part of return {}", product_id, ret.id),
        }
        .into());
    }

    let inspected: i64 = records
        .iter()
        .filter(|r| r.return_id == ret.id && r.product_id == product_id)
        .map(|r| r.quantity)
        .fold(0, i64::saturating_add);
    let remaining = returned.saturating_sub(inspected).max(0);
    if quantity > remaining {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: remaining,
        }
        .into());
    }
    Ok(())
}

/// Units going back on the shelf: `(product_id, quantity)` for each
/// sellable restock record of `return_id`.
pub fn sellable_restock<'a>(
    records: &'a [RestockRecord],
    return_id: &str,
) -> Vec<(&'a str, i64)> {
    records
        .iter()
        .filter(|r| r.return_id == return_id && r.condition == ItemCondition::Sellable)
        .map(|r| (r.product_id.as_str(), r.quantity))
        .collect()
}
