//! # Backup Document
//!
//! The single JSON file a full backup is written to.
//!
//! ```text
//! {
//!   "version": "1.0",
//!   "timestamp": "2024-03-04T10:15:00.000Z",
//!   "data": {
//!     "products": [ ...exactly as stored... ],
//!     "storeSettings": { ... },
//!     ...
//!   }
//! }
//! ```
//!
//! `data` is keyed by storage key and each value is kept as raw JSON text,
//! so restoring writes back exactly what was exported without passing the
//! records through the typed entities.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{CoreError, CoreResult};

pub const BACKUP_VERSION: &str = "1.0";

#[derive(Debug, Serialize)]
pub struct BackupDocument {
    pub version: String,
    pub timestamp: String,
    pub data: BTreeMap<String, Box<RawValue>>,
}

/// What a file must at least contain to be accepted as a backup.
#[derive(Deserialize)]
struct IncomingDocument {
    version: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    data: Option<BTreeMap<String, Box<RawValue>>>,
}

impl BackupDocument {
    pub fn new(data: BTreeMap<String, Box<RawValue>>, now: DateTime<Utc>) -> Self {
        BackupDocument {
            version: BACKUP_VERSION.to_string(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            data,
        }
    }

    /// Parses a backup file. Anything that is not JSON, or lacks a
    /// non-empty `version` or a `data` object, is rejected.
    pub fn parse(text: &str) -> CoreResult<Self> {
        let incoming: IncomingDocument =
            serde_json::from_str(text).map_err(|_| CoreError::InvalidBackup)?;

        match (incoming.version, incoming.data) {
            (Some(version), Some(data)) if !version.is_empty() => Ok(BackupDocument {
                version,
                timestamp: incoming.timestamp.unwrap_or_default(),
                data,
            }),
            _ => Err(CoreError::InvalidBackup),
        }
    }

    /// Entries worth restoring: JSON `null` values are skipped.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data
            .iter()
            .map(|(key, value)| (key.as_str(), value.get()))
            .filter(|(_, raw)| raw.trim() != "null")
    }

    /// The file contents: indented, with each collection embedded verbatim.
    pub fn to_pretty_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|_| CoreError::InvalidBackup)
    }

    /// Compact encoding, as used for the size estimate.
    pub fn to_compact_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(|_| CoreError::InvalidBackup)
    }
}

/// Human-readable byte count: `512 B`, `1.50 KB`, `2.25 MB`.
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;

    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / KB)
    } else {
        format!("{:.2} MB", bytes as f64 / MB)
    }
}
