//! # Till Admin CLI
//!
//! Back-office maintenance from the command line.
//!
//! ## Usage
//! ```bash
//! till-admin seed [--count N]           # demo catalog (skipped if not empty)
//! till-admin backup  backup.json        # write a backup document
//! till-admin restore backup.json        # overwrite local data from a backup
//! till-admin clear --yes                # wipe everything, seeds come back
//! till-admin export-products products.csv
//! till-admin import-products products.csv
//! till-admin export-customers customers.csv
//! till-admin import-customers customers.csv
//! till-admin stats                      # dashboard, stock value, data size
//! ```
//!
//! Configuration comes from the environment (`TILL_DB_PATH`, `TILL_LOG`,
//! ...), see [`till_admin::config`].

use std::env;
use std::fs;

use anyhow::{bail, Context};
use chrono::Utc;
use serde_json::json;
use tracing::info;

use till_admin::commands::{analytics, catalog, data, inventory};
use till_admin::config::AdminConfig;
use till_admin::{init_tracing, open_database};
use till_db::demo::{seed_demo, DEFAULT_PRODUCT_COUNT};
use till_db::Database;

const USAGE: &str = "\
Till back-office administration

Usage: till-admin <COMMAND> [ARGS]

Commands:
  seed [--count N]            Generate demo products and customers
  backup <FILE>               Write a backup of all local data
  restore <FILE>              Replace local data with a backup
  clear --yes                 Delete all local data
  export-products <FILE>      Write the catalog as CSV
  import-products <FILE>      Append products from CSV
  export-customers <FILE>     Write customers as CSV
  import-customers <FILE>     Append customers from CSV
  stats                       Print dashboard figures as JSON";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{}", USAGE);
        return Ok(());
    };
    if matches!(command, "--help" | "-h" | "help") {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = AdminConfig::load()?;
    init_tracing(&config.log_filter);
    info!(device = %config.device_id, command, "till-admin starting");

    let db = open_database(&config).await?;
    let result = run(&db, command, &args[1..]).await;
    db.close().await;
    result
}

async fn run(db: &Database, command: &str, args: &[String]) -> anyhow::Result<()> {
    let now = Utc::now();

    match command {
        "seed" => {
            let count = match args {
                [] => DEFAULT_PRODUCT_COUNT,
                [flag, value] if flag == "--count" || flag == "-c" => value
                    .parse()
                    .with_context(|| format!("invalid --count: {}", value))?,
                _ => bail!("usage: till-admin seed [--count N]"),
            };
            match seed_demo(db, count, now).await? {
                Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
                None => println!("Catalog is not empty; nothing seeded"),
            }
        }
        "backup" => {
            let path = file_arg(command, args)?;
            let text = data::export_backup(db, now).await?;
            fs::write(path, &text).with_context(|| format!("writing {}", path))?;
            println!("Backup written to {} ({} bytes)", path, text.len());
        }
        "restore" => {
            let path = file_arg(command, args)?;
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            let written = data::restore_backup(db, &text).await?;
            println!("Restored {} collections from {}", written, path);
        }
        "clear" => {
            if args.first().map(String::as_str) != Some("--yes") {
                bail!("refusing to delete all data without --yes");
            }
            data::clear_all_data(db).await?;
            println!("All local data cleared");
        }
        "export-products" => {
            let path = file_arg(command, args)?;
            fs::write(path, catalog::export_products(db))
                .with_context(|| format!("writing {}", path))?;
            println!("Exported {} products to {}", db.products().len(), path);
        }
        "import-products" => {
            let path = file_arg(command, args)?;
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            let added = catalog::import_products(db, &text, now).await?;
            println!("Imported {} products", added);
        }
        "export-customers" => {
            let path = file_arg(command, args)?;
            fs::write(path, catalog::export_customers(db))
                .with_context(|| format!("writing {}", path))?;
            println!("Exported {} customers to {}", db.customers().len(), path);
        }
        "import-customers" => {
            let path = file_arg(command, args)?;
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            let added = catalog::import_customers(db, &text, now).await?;
            println!("Imported {} customers", added);
        }
        "stats" => {
            let stats = json!({
                "dashboard": analytics::dashboard(db),
                "stockValuation": inventory::stock_valuation(db),
                "reorder": inventory::reorder_suggestions(db),
                "dataSize": data::data_size(db).await?,
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        other => bail!("unknown command: {}\n\n{}", other, USAGE),
    }
    Ok(())
}

fn file_arg<'a>(command: &str, args: &'a [String]) -> anyhow::Result<&'a str> {
    match args {
        [path] => Ok(path.as_str()),
        _ => bail!("usage: till-admin {} <FILE>", command),
    }
}
