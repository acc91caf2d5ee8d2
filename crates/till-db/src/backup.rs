//! # Backup & Restore
//!
//! Full exports of every key the back office owns, restores from such an
//! export, and wiping all data.
//!
//! ## Restore Flow
//! ```text
//! text ──► BackupDocument::parse ──Err──► DbError::InvalidBackup (nothing written)
//!               │
//!               ▼
//!      for (key, raw) in entries   (null values skipped, unknown keys skipped)
//!          set_raw(key, raw)        ← verbatim, no typed round-trip
//!               │
//!               ▼
//!      Database::reload_all         ← stores pick up the restored values
//! ```
//!
//! A restore is not atomic across keys: a storage failure half-way leaves
//! the keys written so far in place.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::value::RawValue;
use tracing::{info, warn};

use till_core::backup::{format_size, BackupDocument};

use crate::error::{DbError, DbResult};
use crate::keys;
use crate::pool::Database;

/// Value exported for a key that has never been written.
fn missing_value(key: &str) -> &'static str {
    match key {
        keys::STORE_SETTINGS => "{}",
        keys::SELECTED_LOCATION_ID | keys::CURRENT_USER => "null",
        _ => "[]",
    }
}

impl Database {
    /// Snapshot of every key, values exactly as stored.
    pub async fn create_backup(&self, now: DateTime<Utc>) -> DbResult<BackupDocument> {
        let mut data = BTreeMap::new();
        for key in keys::ALL {
            let raw = match self.storage().get_raw(key).await? {
                Some(text) => RawValue::from_string(text)
                    .or_else(|_| {
                        warn!(key = %key, "Stored value is not valid JSON; exporting default");
                        RawValue::from_string(missing_value(key).to_string())
                    })?,
                None => RawValue::from_string(missing_value(key).to_string())?,
            };
            data.insert(key.to_string(), raw);
        }
        Ok(BackupDocument::new(data, now))
    }

    /// The backup file contents.
    pub async fn export_backup(&self, now: DateTime<Utc>) -> DbResult<String> {
        let document = self.create_backup(now).await?;
        Ok(document.to_pretty_json()?)
    }

    /// Restores a backup file, returning how many keys were written.
    pub async fn restore_backup(&self, text: &str) -> DbResult<usize> {
        let document = BackupDocument::parse(text).map_err(|_| DbError::InvalidBackup)?;

        let mut written = 0;
        for (key, raw) in document.entries() {
            if !keys::ALL.contains(&key) {
                warn!(key = %key, "Skipping unknown key in backup");
                continue;
            }
            self.storage().set_raw(key, raw).await?;
            written += 1;
        }

        self.reload_all().await?;
        info!(
            version = %document.version,
            timestamp = %document.timestamp,
            keys = written,
            "Backup restored"
        );
        Ok(written)
    }

    /// Deletes every key, then reloads; seeded stores start over with their
    /// defaults.
    pub async fn clear_all_data(&self) -> DbResult<()> {
        self.storage().clear(&keys::ALL).await?;
        self.reload_all().await?;
        warn!("All data cleared");
        Ok(())
    }

    /// Size of a compact backup right now: `(bytes, "1.50 KB")`.
    pub async fn backup_size(&self) -> DbResult<(usize, String)> {
        let bytes = self
            .create_backup(Utc::now())
            .await?
            .to_compact_json()?
            .len();
        Ok((bytes, format_size(bytes)))
    }
}
