//! Clocking in and out, breaks, and hours worked.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{new_id, ShiftRecord};

/// Opens a new shift for `employee_id` at `now`.
pub fn clock_in(employee_id: &str, store_location_id: &str, now: DateTime<Utc>) -> ShiftRecord {
    ShiftRecord {
        id: new_id(),
        employee_id: employee_id.to_string(),
        date: now.date_naive(),
        clock_in: now,
        clock_out: None,
        break_start: None,
        break_end: None,
        total_break_minutes: 0,
        notes: None,
        store_location_id: store_location_id.to_string(),
    }
}

/// Closes the employee's open shift that started today.
///
/// A break still running at clock-out is ended first.
pub fn clock_out<'a>(
    shifts: &'a mut [ShiftRecord],
    employee_id: &str,
    now: DateTime<Utc>,
) -> CoreResult<&'a mut ShiftRecord> {
    let today = now.date_naive();
    let shift = shifts
        .iter_mut()
        .find(|s| s.employee_id == employee_id && s.date == today && s.is_open())
        .ok_or_else(|| CoreError::NoOpenShift(employee_id.to_string()))?;

    if on_break(shift) {
        end_break(shift, now);
    }
    shift.clock_out = Some(now);
    Ok(shift)
}

fn on_break(shift: &ShiftRecord) -> bool {
    shift.break_start.is_some() && shift.break_end.is_none()
}

/// Starts a break. Ignored when the shift is closed or already on break.
pub fn start_break(shift: &mut ShiftRecord, now: DateTime<Utc>) -> bool {
    if !shift.is_open() || on_break(shift) {
        return false;
    }
    shift.break_start = Some(now);
    shift.break_end = None;
    true
}

/// Ends the running break and adds its whole minutes to the total.
pub fn end_break(shift: &mut ShiftRecord, now: DateTime<Utc>) -> bool {
    let Some(started) = shift.break_start.filter(|_| shift.break_end.is_none()) else {
        return false;
    };
    shift.total_break_minutes += (now - started).num_minutes().max(0);
    shift.break_end = Some(now);
    true
}

/// Shifts of `employee_id` whose date falls within `from..=to`.
pub fn shifts_between<'a>(
    shifts: &'a [ShiftRecord],
    employee_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<&'a ShiftRecord> {
    shifts
        .iter()
        .filter(|s| s.employee_id == employee_id && s.date >= from && s.date <= to)
        .collect()
}

/// Hours worked over closed shifts in the range, minus breaks, rounded to
/// two decimals. Open shifts count for nothing.
pub fn total_hours(
    shifts: &[ShiftRecord],
    employee_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> f64 {
    let total_seconds: i64 = shifts_between(shifts, employee_id, from, to)
        .into_iter()
        .filter_map(|s| {
            s.clock_out
                .map(|out| (out - s.clock_in).num_seconds() - s.total_break_minutes * 60)
        })
        .sum();

    (total_seconds as f64 / 3600.0 * 100.0).round() / 100.0
}
