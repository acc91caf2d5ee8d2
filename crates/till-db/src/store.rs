//! # Observable Stores
//!
//! In-memory state that mirrors one storage key and tells subscribers about
//! every committed change.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   store.update("p-1", patch)                            │
//! │                              │                                          │
//! │                              ▼                                          │
//! │   1. take the store's write lock (one writer per key at a time)         │
//! │   2. copy the current snapshot, apply the change to the copy           │
//! │   3. serialize the whole collection → LocalStorage::set_json            │
//! │          │                                                              │
//! │          ├── Err ──► return the error, snapshot unchanged               │
//! │          ▼                                                              │
//! │   4. publish the copy on the watch channel                              │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   subscribers see the new Arc<Vec<T>>                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Readers never wait on writers: [`CollectionStore::list`] hands out the
//! current `Arc` snapshot. A snapshot is never mutated after publishing.
//!
//! There is no cross-store transaction. Workflows that touch several stores
//! (checkout, returns) write them one after another.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::debug;

use till_core::types::{Entity, Patch};

use crate::error::{DbError, DbResult};
use crate::kv::LocalStorage;

/// An immutable view of a collection at one point in time.
pub type Snapshot<T> = Arc<Vec<T>>;

/// Produces the records a collection starts with when its key has never
/// been written.
pub type Seed<T> = fn(DateTime<Utc>) -> Vec<T>;

// =============================================================================
// Collection Store
// =============================================================================

/// A persisted list of entities under one storage key.
pub struct CollectionStore<T: Entity> {
    inner: Arc<CollectionInner<T>>,
}

struct CollectionInner<T: Entity> {
    key: &'static str,
    entity: &'static str,
    seed: Option<Seed<T>>,
    storage: LocalStorage,
    state: watch::Sender<Snapshot<T>>,
    write: Mutex<()>,
}

impl<T: Entity> Clone for CollectionStore<T> {
    fn clone(&self) -> Self {
        CollectionStore {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Entity> CollectionStore<T> {
    /// Opens the store, hydrating from `key`. A missing or unreadable value
    /// gives an empty collection.
    pub async fn open(storage: LocalStorage, key: &'static str, entity: &'static str) -> DbResult<Self> {
        Self::open_inner(storage, key, entity, None).await
    }

    /// Like [`open`](Self::open), but a key that has never been written is
    /// initialised with `seed` (and the seed is persisted).
    pub async fn open_seeded(
        storage: LocalStorage,
        key: &'static str,
        entity: &'static str,
        seed: Seed<T>,
    ) -> DbResult<Self> {
        Self::open_inner(storage, key, entity, Some(seed)).await
    }

    async fn open_inner(
        storage: LocalStorage,
        key: &'static str,
        entity: &'static str,
        seed: Option<Seed<T>>,
    ) -> DbResult<Self> {
        let items = hydrate(&storage, key, seed).await?;
        debug!(key = %key, count = items.len(), "Store hydrated");

        let (state, _) = watch::channel(Arc::new(items));
        Ok(CollectionStore {
            inner: Arc::new(CollectionInner {
                key,
                entity,
                seed,
                storage,
                state,
                write: Mutex::new(()),
            }),
        })
    }

    pub fn key(&self) -> &'static str {
        self.inner.key
    }

    /// Current snapshot.
    pub fn list(&self) -> Snapshot<T> {
        Arc::clone(&self.inner.state.borrow())
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.find(|item| item.id() == id)
    }

    /// Like [`get`](Self::get) but missing records are an error.
    pub fn require(&self, id: &str) -> DbResult<T> {
        self.get(id)
            .ok_or_else(|| DbError::not_found(self.inner.entity, id))
    }

    /// First record matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.inner.state.borrow().iter().find(|item| predicate(item)).cloned()
    }

    /// Every record matching `predicate`, in collection order.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.inner
            .state
            .borrow()
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    /// Replaces the whole collection.
    pub async fn set_all(&self, items: Vec<T>) -> DbResult<()> {
        self.modify(|current| {
            *current = items;
            Ok(())
        })
        .await
    }

    /// Appends `item` and returns it.
    pub async fn add(&self, item: T) -> DbResult<T> {
        self.modify(|current| {
            current.push(item.clone());
            Ok(item)
        })
        .await
    }

    /// Merges `patch` into the record with `id` and refreshes its
    /// modification time.
    pub async fn update<P: Patch<T>>(&self, id: &str, patch: P) -> DbResult<T> {
        self.update_with(id, |item| {
            patch.apply_to(item);
            Ok(())
        })
        .await
        .map(|(item, ())| item)
    }

    /// Runs `f` on the record with `id`. When `f` fails nothing is written.
    ///
    /// Returns the record as committed together with `f`'s result.
    pub async fn update_with<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut T) -> DbResult<R>,
    ) -> DbResult<(T, R)> {
        let entity = self.inner.entity;
        self.modify(|items| {
            let item = items
                .iter_mut()
                .find(|item| item.id() == id)
                .ok_or_else(|| DbError::not_found(entity, id))?;
            let out = f(item)?;
            item.touch(Utc::now());
            Ok((item.clone(), out))
        })
        .await
    }

    /// Removes the record with `id`. Returns whether anything was removed.
    pub async fn remove(&self, id: &str) -> DbResult<bool> {
        self.modify(|items| {
            let before = items.len();
            items.retain(|item| item.id() != id);
            Ok(items.len() != before)
        })
        .await
    }

    /// Applies `f` to a copy of the collection, persists the copy and
    /// publishes it. When `f` or the write fails the published snapshot is
    /// left as it was.
    pub async fn modify<R>(&self, f: impl FnOnce(&mut Vec<T>) -> DbResult<R>) -> DbResult<R> {
        let _guard = self.inner.write.lock().await;

        let mut items: Vec<T> = self.inner.state.borrow().as_ref().clone();
        let out = f(&mut items)?;

        self.inner.storage.set_json(self.inner.key, &items).await?;
        debug!(key = %self.inner.key, count = items.len(), "Store committed");
        self.inner.state.send_replace(Arc::new(items));
        Ok(out)
    }

    /// A receiver that sees every snapshot committed from now on.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.inner.state.subscribe()
    }

    /// Re-reads the collection from storage, e.g. after a restore.
    pub async fn reload(&self) -> DbResult<()> {
        let _guard = self.inner.write.lock().await;
        let items = hydrate(&self.inner.storage, self.inner.key, self.inner.seed).await?;
        debug!(key = %self.inner.key, count = items.len(), "Store reloaded");
        self.inner.state.send_replace(Arc::new(items));
        Ok(())
    }
}

async fn hydrate<T: Entity>(
    storage: &LocalStorage,
    key: &'static str,
    seed: Option<Seed<T>>,
) -> DbResult<Vec<T>> {
    if let Some(seed) = seed {
        if storage.get_raw(key).await?.is_none() {
            let items = seed(Utc::now());
            storage.set_json(key, &items).await?;
            return Ok(items);
        }
    }
    storage.get_json_or(key, Vec::new()).await
}

// =============================================================================
// Singleton Store
// =============================================================================

/// A single persisted value (settings object, selected id, signed-in user).
///
/// A missing or unreadable value reads as `T::default()`.
pub struct SingletonStore<T> {
    inner: Arc<SingletonInner<T>>,
}

struct SingletonInner<T> {
    key: &'static str,
    storage: LocalStorage,
    state: watch::Sender<Arc<T>>,
    write: Mutex<()>,
}

impl<T> Clone for SingletonStore<T> {
    fn clone(&self) -> Self {
        SingletonStore {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SingletonStore<T>
where
    T: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub async fn open(storage: LocalStorage, key: &'static str) -> DbResult<Self> {
        let value: T = storage.get_json_or(key, T::default()).await?;
        let (state, _) = watch::channel(Arc::new(value));
        Ok(SingletonStore {
            inner: Arc::new(SingletonInner {
                key,
                storage,
                state,
                write: Mutex::new(()),
            }),
        })
    }

    pub fn key(&self) -> &'static str {
        self.inner.key
    }

    pub fn get(&self) -> T {
        self.inner.state.borrow().as_ref().clone()
    }

    /// Replaces the value.
    pub async fn set(&self, value: T) -> DbResult<T> {
        let _guard = self.inner.write.lock().await;
        self.commit(value).await
    }

    /// Merges `patch` into the current value.
    pub async fn update<P: Patch<T>>(&self, patch: P) -> DbResult<T> {
        let _guard = self.inner.write.lock().await;
        let mut value = self.get();
        patch.apply_to(&mut value);
        self.commit(value).await
    }

    /// Writes the default value.
    pub async fn reset(&self) -> DbResult<T> {
        self.set(T::default()).await
    }

    /// Deletes the key; the store reads as the default afterwards.
    pub async fn clear(&self) -> DbResult<()> {
        let _guard = self.inner.write.lock().await;
        self.inner.storage.remove(self.inner.key).await?;
        self.inner.state.send_replace(Arc::new(T::default()));
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<T>> {
        self.inner.state.subscribe()
    }

    pub async fn reload(&self) -> DbResult<()> {
        let _guard = self.inner.write.lock().await;
        let value: T = self
            .inner
            .storage
            .get_json_or(self.inner.key, T::default())
            .await?;
        self.inner.state.send_replace(Arc::new(value));
        Ok(())
    }

    /// Caller holds the write lock.
    async fn commit(&self, value: T) -> DbResult<T> {
        self.inner.storage.set_json(self.inner.key, &value).await?;
        self.inner.state.send_replace(Arc::new(value.clone()));
        debug!(key = %self.inner.key, "Value committed");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use till_core::{Category, CategoryPatch, StoreSettings, StoreSettingsPatch};

    const SCRATCH: &str = "scratchCategories";

    async fn storage() -> LocalStorage {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.storage().clone()
    }

    #[tokio::test]
    async fn test_crud_persists_every_change() {
        let kv = storage().await;
        let store: CollectionStore<Category> = CollectionStore::open(kv.clone(), SCRATCH, "Category")
            .await
            .unwrap();
        assert!(store.is_empty());

        let drinks = store.add(Category::new("Drinks", Utc::now())).await.unwrap();
        store.add(Category::new("Snacks", Utc::now())).await.unwrap();

        let patch = CategoryPatch {
            name: Some("Beverages".into()),
            ..Default::default()
        };
        let updated = store.update(&drinks.id, patch).await.unwrap();
        assert_eq!(updated.name, "Beverages");
        assert!(updated.updated_at >= drinks.updated_at);

        assert!(store.remove(&drinks.id).await.unwrap());
        assert!(!store.remove(&drinks.id).await.unwrap());

        let reopened: CollectionStore<Category> =
            CollectionStore::open(kv, SCRATCH, "Category").await.unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.list()[0].name, "Snacks");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store: CollectionStore<Category> =
            CollectionStore::open(storage().await, SCRATCH, "Category").await.unwrap();
        let err = store.update("nope", CategoryPatch::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_failed_closure_leaves_snapshot_untouched() {
        let store: CollectionStore<Category> =
            CollectionStore::open(storage().await, SCRATCH, "Category").await.unwrap();
        let drinks = store.add(Category::new("Drinks", Utc::now())).await.unwrap();

        let result = store
            .update_with(&drinks.id, |c| {
                c.name = "changed".into();
                Err::<(), _>(DbError::Internal("boom".into()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(store.get(&drinks.id).unwrap().name, "Drinks");
    }

    #[tokio::test]
    async fn test_subscribers_see_committed_snapshots() {
        let store: CollectionStore<Category> =
            CollectionStore::open(storage().await, SCRATCH, "Category").await.unwrap();
        let mut rx = store.subscribe();

        store.add(Category::new("Drinks", Utc::now())).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_value_hydrates_empty_and_reload_picks_up_writes() {
        let kv = storage().await;
        kv.set_raw(SCRATCH, "[{broken").await.unwrap();

        let store: CollectionStore<Category> =
            CollectionStore::open(kv.clone(), SCRATCH, "Category").await.unwrap();
        assert!(store.is_empty());

        kv.set_json(SCRATCH, &vec![Category::new("Drinks", Utc::now())])
            .await
            .unwrap();
        store.reload().await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_seed_only_applies_to_unwritten_key() {
        fn seed(now: DateTime<Utc>) -> Vec<Category> {
            vec![Category::new("Seeded", now)]
        }

        let kv = storage().await;
        let store: CollectionStore<Category> =
            CollectionStore::open_seeded(kv.clone(), SCRATCH, "Category", seed)
            .await
            .unwrap();
        assert_eq!(store.len(), 1);

        store.set_all(Vec::new()).await.unwrap();
        store.reload().await.unwrap();
        assert!(store.is_empty());

        kv.remove(SCRATCH).await.unwrap();
        store.reload().await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_singleton_update_reset_and_partial_document() {
        let kv = storage().await;
        kv.set_raw("scratchSettings", r#"{"storeName":"Corner Shop"}"#)
            .await
            .unwrap();

        let settings: SingletonStore<StoreSettings> =
            SingletonStore::open(kv.clone(), "scratchSettings").await.unwrap();
        assert_eq!(settings.get().store_name, "Corner Shop");
        assert_eq!(settings.get().currency_symbol, "$");

        let patch = StoreSettingsPatch {
            tax_rate_percent: Some(8.5),
            ..Default::default()
        };
        assert_eq!(settings.update(patch).await.unwrap().tax_rate_percent, 8.5);

        settings.reset().await.unwrap();
        assert_eq!(settings.get(), StoreSettings::default());
    }
}
