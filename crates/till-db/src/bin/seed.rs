//! # Demo Data Generator
//!
//! Fills a database with a demo catalog and customers for development.
//!
//! ## Usage
//! ```bash
//! # 500 products (default)
//! cargo run -p till-db --bin seed
//!
//! # custom amount and file
//! cargo run -p till-db --bin seed -- --count 2000 --db ./data/till.db
//! ```
//!
//! See [`till_db::demo`] for what gets generated.

use anyhow::{bail, Context};
use chrono::Utc;
use std::env;
use tracing::info;

use till_db::demo::{seed_demo, DEFAULT_PRODUCT_COUNT};
use till_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count = DEFAULT_PRODUCT_COUNT;
    let mut db_path = String::from("./till_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                let value = args.get(i + 1).context("--count needs a value")?;
                count = value
                    .parse()
                    .with_context(|| format!("invalid --count: {}", value))?;
                i += 1;
            }
            "--db" | "-d" => {
                db_path = args.get(i + 1).context("--db needs a value")?.clone();
                i += 1;
            }
            "--help" | "-h" => {
                println!("Till demo data generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./till_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => bail!("unknown argument: {}", other),
        }
        i += 1;
    }

    info!(db = %db_path, count, "Seeding demo data");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let start = std::time::Instant::now();
    if let Some(summary) = seed_demo(&db, count, Utc::now()).await? {
        info!(
            products = summary.products,
            categories = summary.categories,
            customers = summary.customers,
            low_stock = summary.low_stock,
            elapsed = ?start.elapsed(),
            "Seed complete"
        );
    }

    db.close().await;
    Ok(())
}
