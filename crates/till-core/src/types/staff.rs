//! Employees, their shifts, and back-office user accounts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{new_id, Entity};

// =============================================================================
// Employee
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    Admin,
    Manager,
    Cashier,
    Stock,
    Supervisor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: EmployeeRole,
    pub store_location_id: String,
    #[ts(as = "String")]
    pub hire_date: NaiveDate,
    pub hourly_wage_cents: i64,
    pub is_active: bool,
    /// Last four digits only.
    #[serde(default)]
    pub ssn_last4: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: EmployeeRole,
        store_location_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Employee {
            id: new_id(),
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            role,
            store_location_id: store_location_id.into(),
            hire_date: now.date_naive(),
            hourly_wage_cents: 0,
            is_active: true,
            ssn_last4: None,
            emergency_contact: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Employee {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

patch_struct! {
    EmployeePatch for Employee {
        name: String,
        email: String,
        phone: String,
        role: EmployeeRole,
        store_location_id: String,
        hire_date: NaiveDate,
        hourly_wage_cents: i64,
        is_active: bool,
        ssn_last4: Option<String>,
        emergency_contact: Option<String>,
        address: Option<String>,
    }
}

// =============================================================================
// Shift Record
// =============================================================================

/// One clock-in/clock-out span for an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShiftRecord {
    pub id: String,
    pub employee_id: String,
    /// Calendar day the shift started on.
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub clock_in: DateTime<Utc>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub clock_out: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub break_start: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub break_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_break_minutes: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub store_location_id: String,
}

impl ShiftRecord {
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }
}

impl Entity for ShiftRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

patch_struct! {
    ShiftRecordPatch for ShiftRecord {
        clock_in: DateTime<Utc>,
        clock_out: Option<DateTime<Utc>>,
        total_break_minutes: i64,
        notes: Option<String>,
    }
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    Cashier,
}

impl UserRole {
    /// Whether a user with this role may use a feature gated at `required`.
    ///
    /// Admins may do everything, managers everything except admin-only
    /// features, cashiers only cashier features.
    pub fn allows(&self, required: UserRole) -> bool {
        match self {
            UserRole::Admin => true,
            UserRole::Manager => required != UserRole::Admin,
            UserRole::Cashier => required == UserRole::Cashier,
        }
    }
}

/// A back-office account. Only the argon2 hash of the password is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub active: bool,
    #[serde(default)]
    #[ts(skip)]
    pub password_hash: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The account without its credentials, as stored for the signed-in user.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

patch_struct! {
    UserPatch for User {
        email: String,
        name: String,
        role: UserRole,
        active: bool,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(UserRole::Admin.allows(UserRole::Admin));
        assert!(UserRole::Manager.allows(UserRole::Manager));
        assert!(UserRole::Manager.allows(UserRole::Cashier));
        assert!(!UserRole::Manager.allows(UserRole::Admin));
        assert!(UserRole::Cashier.allows(UserRole::Cashier));
        assert!(!UserRole::Cashier.allows(UserRole::Manager));
    }

    #[test]
    fn test_profile_drops_password_hash() {
        let now = Utc::now();
        let user = User {
            id: "u1".into(),
            email: "a@b.c".into(),
            name: "A".into(),
            role: UserRole::Cashier,
            active: true,
            password_hash: "$argon2id$...".into(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "cashier");
    }
}
