//! # Till Admin Library
//!
//! Back-office commands for the till: the workflows that touch more than
//! one store (checkout, stock adjustment, returns, data management) plus
//! the configuration and error plumbing the `till-admin` binary needs.
//!
//! ## Module Organization
//! ```text
//! till_admin/
//! ├── lib.rs          ◄─── You are here (tracing, database bootstrap)
//! ├── config.rs       ◄─── AdminConfig from the environment
//! ├── state.rs        ◄─── CartState (sale in progress)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── checkout.rs ◄─── Cart and checkout
//! │   ├── inventory.rs◄─── Stock adjustment, reorder, valuation
//! │   ├── loyalty.rs  ◄─── Points and rewards
//! │   ├── catalog.rs  ◄─── Product/customer CSV
//! │   ├── data.rs     ◄─── Backup, restore, clear
//! │   ├── returns.rs  ◄─── Return approval and restocking
//! │   ├── staff.rs    ◄─── Timesheets
//! │   ├── auth.rs     ◄─── Sign-in and role checks
//! │   └── analytics.rs◄─── Dashboard and reports
//! └── error.rs        ◄─── ApiError returned by every command
//! ```
//!
//! ## Calling Convention
//! Commands are plain async functions. Each takes only what it needs:
//! ```rust,ignore
//! // Only needs the database
//! commands::inventory::adjust_stock(&db, &product_id, StockAdjustment::Add, 10, None).await?;
//!
//! // Needs the cart as well
//! commands::checkout::checkout(&db, &cart, request, Utc::now()).await?;
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use till_db::Database;

use config::AdminConfig;

/// Installs the global tracing subscriber.
///
/// ## Log Levels
/// - `TILL_LOG=debug` - Show debug messages
/// - `TILL_LOG=till=trace` - Show trace for till crates only
/// - Default: `info,till=debug,sqlx=warn`
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Opens the database at the configured path, creating its directory.
pub async fn open_database(config: &AdminConfig) -> anyhow::Result<Database> {
    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating data directory {}", dir.display()))?;
    }

    let db = Database::new(config.db_config())
        .await
        .with_context(|| format!("opening {}", config.db_path.display()))?;
    info!(db_path = ?config.db_path, device = %config.device_id, "Database ready");
    Ok(db)
}
