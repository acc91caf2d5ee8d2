//! Data management: backup, restore and wiping local data.

use chrono::{DateTime, Utc};
use serde::Serialize;

use till_db::Database;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSize {
    pub bytes: usize,
    pub formatted: String,
}

/// The full backup document, pretty-printed.
pub async fn export_backup(db: &Database, now: DateTime<Utc>) -> Result<String, ApiError> {
    Ok(db.export_backup(now).await?)
}

/// Overwrites stored data with the backup's collections and reloads every
/// store. Returns how many collections were written.
pub async fn restore_backup(db: &Database, text: &str) -> Result<usize, ApiError> {
    Ok(db.restore_backup(text).await?)
}

pub async fn clear_all_data(db: &Database) -> Result<(), ApiError> {
    Ok(db.clear_all_data().await?)
}

pub async fn data_size(db: &Database) -> Result<DataSize, ApiError> {
    let (bytes, formatted) = db.backup_size().await?;
    Ok(DataSize { bytes, formatted })
}
