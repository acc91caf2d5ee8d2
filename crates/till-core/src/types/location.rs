use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{new_id, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A physical shop. One location at a time is "selected" as the current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoreLocation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub manager: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl StoreLocation {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        StoreLocation {
            id: new_id(),
            name: name.into(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            phone: String::new(),
            email: String::new(),
            manager: String::new(),
            is_active: true,
            created_at: now,
            coordinates: None,
        }
    }
}

impl Entity for StoreLocation {
    fn id(&self) -> &str {
        &self.id
    }
}

patch_struct! {
    StoreLocationPatch for StoreLocation {
        name: String,
        address: String,
        city: String,
        state: String,
        zip_code: String,
        phone: String,
        email: String,
        manager: String,
        is_active: bool,
        coordinates: Option<Coordinates>,
    }
}
