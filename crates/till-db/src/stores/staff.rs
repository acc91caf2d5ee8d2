//! # Employee Store
//!
//! Employees and their shift records, kept under two keys
//! (`employees`, `shiftRecords`) but managed together.
//!
//! ## Shift Lifecycle
//! ```text
//! clock_in ──► open shift ──► start_break ──► end_break ──► ... ──► clock_out
//!                                  (any number of breaks; minutes add up)
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use till_core::shift;
use till_core::{Employee, EmployeeRole, ShiftRecord};

use crate::error::DbResult;
use crate::keys;
use crate::kv::LocalStorage;
use crate::store::CollectionStore;

#[derive(Clone)]
pub struct EmployeeStore {
    employees: CollectionStore<Employee>,
    shifts: CollectionStore<ShiftRecord>,
}

impl EmployeeStore {
    pub(crate) async fn open(storage: LocalStorage) -> DbResult<Self> {
        let employees = CollectionStore::open_seeded(
            storage.clone(),
            keys::EMPLOYEES,
            "Employee",
            default_employees,
        )
        .await?;
        let shifts = CollectionStore::open(storage, keys::SHIFT_RECORDS, "ShiftRecord").await?;
        Ok(EmployeeStore { employees, shifts })
    }

    /// Employee records (CRUD).
    pub fn employees(&self) -> &CollectionStore<Employee> {
        &self.employees
    }

    /// Shift records (CRUD).
    pub fn shifts(&self) -> &CollectionStore<ShiftRecord> {
        &self.shifts
    }

    pub fn active_employees(&self) -> Vec<Employee> {
        self.employees.filter(|e| e.is_active)
    }

    pub fn at_location(&self, store_location_id: &str) -> Vec<Employee> {
        self.employees
            .filter(|e| e.store_location_id == store_location_id)
    }

    /// Opens a shift for `employee_id` at `store_location_id`.
    pub async fn clock_in(
        &self,
        employee_id: &str,
        store_location_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<ShiftRecord> {
        let record = self
            .shifts
            .add(shift::clock_in(employee_id, store_location_id, now))
            .await?;
        info!(employee = %employee_id, shift = %record.id, "Clocked in");
        Ok(record)
    }

    /// Closes the employee's open shift from today.
    pub async fn clock_out(&self, employee_id: &str, now: DateTime<Utc>) -> DbResult<ShiftRecord> {
        let record = self
            .shifts
            .modify(|records| Ok(shift::clock_out(records, employee_id, now)?.clone()))
            .await?;
        info!(employee = %employee_id, shift = %record.id, "Clocked out");
        Ok(record)
    }

    /// Starts a break on shift `shift_id`. Returns the shift and whether a
    /// break was actually started.
    pub async fn start_break(&self, shift_id: &str, now: DateTime<Utc>) -> DbResult<(ShiftRecord, bool)> {
        self.shifts
            .update_with(shift_id, |record| Ok(shift::start_break(record, now)))
            .await
    }

    /// Ends the running break on shift `shift_id`.
    pub async fn end_break(&self, shift_id: &str, now: DateTime<Utc>) -> DbResult<(ShiftRecord, bool)> {
        self.shifts
            .update_with(shift_id, |record| Ok(shift::end_break(record, now)))
            .await
    }

    /// Shifts of `employee_id` dated within `from..=to`.
    pub fn shifts_between(&self, employee_id: &str, from: NaiveDate, to: NaiveDate) -> Vec<ShiftRecord> {
        shift::shifts_between(&self.shifts.list(), employee_id, from, to)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Hours worked in `from..=to`, breaks excluded, two decimals.
    pub fn total_hours(&self, employee_id: &str, from: NaiveDate, to: NaiveDate) -> f64 {
        shift::total_hours(&self.shifts.list(), employee_id, from, to)
    }

    pub async fn reload(&self) -> DbResult<()> {
        self.employees.reload().await?;
        self.shifts.reload().await
    }
}

fn default_employees(now: DateTime<Utc>) -> Vec<Employee> {
    let staff = [
        (
            "emp-001",
            "John Doe",
            "john@store.com",
            "(555) 111-1111",
            EmployeeRole::Manager,
            NaiveDate::from_ymd_opt(2023, 1, 15),
            2_500,
            "1234",
            "(555) 111-2222",
            "789 Oak Street",
        ),
        (
            "emp-002",
            "Jane Smith",
            "jane@store.com",
            "(555) 111-3333",
            EmployeeRole::Cashier,
            NaiveDate::from_ymd_opt(2023, 6, 1),
            1_650,
            "5678",
            "(555) 111-4444",
            "654 Elm Street",
        ),
    ];

    staff
        .into_iter()
        .map(|(id, name, email, phone, role, hired, wage, ssn, contact, address)| {
            let mut employee = Employee::new(name, email, role, "loc-001", now);
            employee.id = id.to_string();
            employee.phone = phone.to_string();
            employee.hire_date = hired.unwrap_or(employee.hire_date);
            employee.hourly_wage_cents = wage;
            employee.ssn_last4 = Some(ssn.to_string());
            employee.emergency_contact = Some(contact.to_string());
            employee.address = Some(address.to_string());
            employee
        })
        .collect()
}
