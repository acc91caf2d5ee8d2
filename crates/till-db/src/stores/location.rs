//! # Location Store
//!
//! Store locations plus the id of the one currently selected
//! (`storeLocations`, `selectedLocationId`).
//!
//! The selection always points at an existing location while any exist:
//! a fresh install selects the first seeded location, and removing the
//! selected location moves the selection to the first one left.

use chrono::{DateTime, Utc};
use tracing::info;

use till_core::{Coordinates, StoreLocation, StoreLocationPatch};

use crate::error::DbResult;
use crate::keys;
use crate::kv::LocalStorage;
use crate::store::{CollectionStore, SingletonStore};

#[derive(Clone)]
pub struct LocationStore {
    locations: CollectionStore<StoreLocation>,
    selected: SingletonStore<Option<String>>,
}

impl LocationStore {
    pub(crate) async fn open(storage: LocalStorage) -> DbResult<Self> {
        let locations = CollectionStore::open_seeded(
            storage.clone(),
            keys::STORE_LOCATIONS,
            "StoreLocation",
            default_locations,
        )
        .await?;
        let selected = SingletonStore::open(storage, keys::SELECTED_LOCATION_ID).await?;

        let store = LocationStore {
            locations,
            selected,
        };
        store.ensure_selection().await?;
        Ok(store)
    }

    pub fn locations(&self) -> &CollectionStore<StoreLocation> {
        &self.locations
    }

    pub fn active_locations(&self) -> Vec<StoreLocation> {
        self.locations.filter(|l| l.is_active)
    }

    pub async fn add_location(&self, name: &str, now: DateTime<Utc>) -> DbResult<StoreLocation> {
        let location = self.locations.add(StoreLocation::new(name, now)).await?;
        info!(location = %location.id, name = %location.name, "Location added");
        Ok(location)
    }

    pub async fn update_location(&self, id: &str, patch: StoreLocationPatch) -> DbResult<StoreLocation> {
        self.locations.update(id, patch).await
    }

    /// Removes a location. When it was the selected one, the first remaining
    /// location becomes selected (or nothing, if none remain).
    pub async fn delete_location(&self, id: &str) -> DbResult<bool> {
        let removed = self.locations.remove(id).await?;
        if removed && self.selected_id().as_deref() == Some(id) {
            let next = self.locations.list().first().map(|l| l.id.clone());
            info!(removed = %id, selected = ?next, "Selected location removed");
            self.selected.set(next).await?;
        }
        Ok(removed)
    }

    /// Makes `id` the current location.
    pub async fn select(&self, id: &str) -> DbResult<StoreLocation> {
        let location = self.locations.require(id)?;
        self.selected.set(Some(location.id.clone())).await?;
        Ok(location)
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected.get()
    }

    /// The current location, if the selection resolves.
    pub fn selected(&self) -> Option<StoreLocation> {
        self.selected_id().and_then(|id| self.locations.get(&id))
    }

    pub async fn reload(&self) -> DbResult<()> {
        self.locations.reload().await?;
        self.selected.reload().await?;
        self.ensure_selection().await
    }

    async fn ensure_selection(&self) -> DbResult<()> {
        if self.selected_id().is_none() {
            if let Some(first) = self.locations.list().first() {
                self.selected.set(Some(first.id.clone())).await?;
            }
        }
        Ok(())
    }
}

fn default_locations(now: DateTime<Utc>) -> Vec<StoreLocation> {
    let sites = [
        (
            "loc-001",
            "Main Store",
            "123 Main Street",
            "10001",
            "(555) 123-4567",
            "main@store.com",
            "John Manager",
            (40.7128, -74.0060),
        ),
        (
            "loc-002",
            "Downtown Branch",
            "456 Park Avenue",
            "10022",
            "(555) 234-5678",
            "downtown@store.com",
            "Jane Manager",
            (40.7614, -73.9776),
        ),
    ];

    sites
        .into_iter()
        .map(|(id, name, address, zip, phone, email, manager, (lat, lng))| {
            let mut location = StoreLocation::new(name, now);
            location.id = id.to_string();
            location.address = address.to_string();
            location.city = "New York".into();
            location.state = "NY".into();
            location.zip_code = zip.to_string();
            location.phone = phone.to_string();
            location.email = email.to_string();
            location.manager = manager.to_string();
            location.coordinates = Some(Coordinates { lat, lng });
            location
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_fresh_install_selects_main_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let locations = db.locations();

        assert_eq!(locations.locations().len(), 2);
        assert_eq!(locations.selected_id().as_deref(), Some("loc-001"));
        assert_eq!(locations.selected().unwrap().name, "Main Store");
    }

    #[tokio::test]
    async fn test_deleting_selected_moves_selection() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let locations = db.locations();

        assert!(locations.delete_location("loc-001").await.unwrap());
        assert_eq!(locations.selected_id().as_deref(), Some("loc-002"));

        // removing a non-selected location leaves the selection alone
        let extra = locations.add_location("Airport", Utc::now()).await.unwrap();
        locations.delete_location(&extra.id).await.unwrap();
        assert_eq!(locations.selected_id().as_deref(), Some("loc-002"));

        locations.delete_location("loc-002").await.unwrap();
        assert!(locations.selected().is_none());
    }

    #[tokio::test]
    async fn test_select_unknown_location() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.locations().select("loc-404").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.locations().selected_id().as_deref(), Some("loc-001"));
    }

    #[tokio::test]
    async fn test_update_location() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let updated = db
            .locations()
            .update_location(
                "loc-002",
                StoreLocationPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.is_active);
        assert_eq!(db.locations().active_locations().len(), 1);
    }
}
