use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{new_id, Entity};
use crate::money::Money;

/// A customer with loyalty balance and lifetime spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,

    /// Never negative.
    #[serde(default)]
    pub loyalty_points: i64,

    /// Lifetime spend in cents, credited at checkout.
    #[serde(default)]
    pub total_spent_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Customer {
            id: new_id(),
            name: name.into(),
            email: None,
            phone: None,
            address: None,
            city: None,
            postal_code: None,
            loyalty_points: 0,
            total_spent_cents: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn total_spent(&self) -> Money {
        Money::from_cents(self.total_spent_cents)
    }
}

impl Entity for Customer {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

patch_struct! {
    CustomerPatch for Customer {
        name: String,
        email: Option<String>,
        phone: Option<String>,
        address: Option<String>,
        city: Option<String>,
        postal_code: Option<String>,
        loyalty_points: i64,
        total_spent_cents: i64,
    }
}
