//! Staff time tracking.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use till_core::ShiftRecord;
use till_db::Database;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetRow {
    pub employee_id: String,
    pub name: String,
    pub hours: f64,
    pub hourly_wage_cents: i64,
    /// Hours × wage, rounded to the cent.
    pub pay_cents: i64,
}

/// Clocks an active employee in at their home location.
pub async fn clock_in(
    db: &Database,
    employee_id: &str,
    now: DateTime<Utc>,
) -> Result<ShiftRecord, ApiError> {
    let employee = db.employees().employees().require(employee_id)?;
    if !employee.is_active {
        return Err(ApiError::validation(format!(
            "{} is not an active employee",
            employee.name
        )));
    }
    Ok(db
        .employees()
        .clock_in(employee_id, &employee.store_location_id, now)
        .await?)
}

/// Hours and pay per active employee over `from..=to`.
pub fn timesheet(db: &Database, from: NaiveDate, to: NaiveDate) -> Vec<TimesheetRow> {
    db.employees()
        .active_employees()
        .into_iter()
        .map(|employee| {
            let hours = db.employees().total_hours(&employee.id, from, to);
            TimesheetRow {
                pay_cents: (hours * employee.hourly_wage_cents as f64).round() as i64,
                employee_id: employee.id,
                name: employee.name,
                hours,
                hourly_wage_cents: employee.hourly_wage_cents,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use till_db::DbConfig;

    #[tokio::test]
    async fn test_timesheet_pays_closed_shifts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let day = start.date_naive();

        clock_in(&db, "emp-002", start).await.unwrap();
        db.employees()
            .clock_out("emp-002", start + chrono::Duration::hours(8))
            .await
            .unwrap();

        let rows = timesheet(&db, day, day);
        let jane = rows.iter().find(|r| r.employee_id == "emp-002").unwrap();
        assert_eq!(jane.hours, 8.0);
        assert_eq!(jane.pay_cents, 8 * 1_650);

        let john = rows.iter().find(|r| r.employee_id == "emp-001").unwrap();
        assert_eq!(john.hours, 0.0);
        assert_eq!(john.pay_cents, 0);
    }

    #[tokio::test]
    async fn test_inactive_employee_cannot_clock_in() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.employees()
            .employees()
            .update_with("emp-001", |e| {
                e.is_active = false;
                Ok(())
            })
            .await
            .unwrap();

        assert!(clock_in(&db, "emp-001", Utc::now()).await.is_err());
        assert!(db.employees().shifts().is_empty());
    }
}
