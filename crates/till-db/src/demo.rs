//! # Demo Data
//!
//! A generated catalog and a few customers for development and demos.
//!
//! ## Generated Data
//! - One category per department (Beverages, Snacks, Dairy, Frozen, Grocery)
//! - Products `{DEPT}-{NAM}-{NNN}` with sizes, prices $1.99 - $13.49 and
//!   stock 0 - 40 (so some are low stock)
//! - A handful of customers with loyalty points
//!
//! Everything is written with one store write per collection.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use till_core::{Category, Customer, Product};

use crate::error::DbResult;
use crate::pool::Database;

/// Products generated when no count is given.
pub const DEFAULT_PRODUCT_COUNT: usize = 500;

const DEPARTMENTS: &[(&str, &str, &[&str])] = &[
    (
        "BEV",
        "Beverages",
        &[
            "Cola", "Lemon Soda", "Sparkling Water", "Still Water", "Orange Juice",
            "Apple Juice", "Iced Tea", "Cold Brew", "Energy Drink", "Lemonade",
        ],
    ),
    (
        "SNK",
        "Snacks",
        &[
            "Salted Chips", "Tortilla Chips", "Pretzels", "Popcorn", "Trail Mix",
            "Chocolate Bar", "Gummy Bears", "Oat Cookies", "Rice Crackers", "Peanuts",
        ],
    ),
    (
        "DRY",
        "Dairy",
        &[
            "Whole Milk", "Oat Milk", "Cheddar", "Mozzarella", "Butter",
            "Greek Yogurt", "Cream Cheese", "Eggs Dozen", "Sour Cream", "Feta",
        ],
    ),
    (
        "FRZ",
        "Frozen",
        &[
            "Vanilla Ice Cream", "Frozen Pizza", "Frozen Peas", "Fish Fingers", "Waffles",
            "Sorbet", "Frozen Berries", "Dumplings", "Fries", "Ice Lollies",
        ],
    ),
    (
        "GRO",
        "Grocery",
        &[
            "Spaghetti", "Penne", "White Rice", "Canned Beans", "Canned Tomatoes",
            "Oatmeal", "Peanut Butter", "Honey", "Flour", "Sugar",
        ],
    ),
];

/// Size name and price add-on in cents.
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 100),
    ("Large", 200),
    ("Family", 350),
    ("Multipack", 500),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Ada Lovelace", "ada@example.com"),
    ("Grace Hopper", "grace@example.com"),
    ("Alan Turing", "alan@example.com"),
    ("Katherine Johnson", "katherine@example.com"),
    ("Edsger Dijkstra", "edsger@example.com"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub products: usize,
    pub categories: usize,
    pub customers: usize,
    pub low_stock: usize,
}

/// Writes up to `count` demo products plus categories and customers.
///
/// Returns `None` without writing when the catalog already has products.
pub async fn seed_demo(db: &Database, count: usize, now: DateTime<Utc>) -> DbResult<Option<SeedSummary>> {
    if !db.products().is_empty() {
        warn!(
            existing = db.products().len(),
            "Database already has products; skipping seed to avoid duplicates"
        );
        return Ok(None);
    }

    let mut categories = Vec::new();
    let mut products = Vec::new();
    'outer: for (dept_idx, (code, dept_name, names)) in DEPARTMENTS.iter().enumerate() {
        let category = Category::new(*dept_name, now);
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, addon)) in SIZES.iter().enumerate() {
                if products.len() >= count {
                    categories.push(category);
                    break 'outer;
                }
                let n = dept_idx * 1000 + name_idx * 20 + size_idx;
                products.push(generate_product(code, name, size, *addon, n, &category.id, now));
            }
        }
        categories.push(category);
    }

    let customers: Vec<Customer> = CUSTOMERS
        .iter()
        .enumerate()
        .map(|(n, (name, email))| {
            let mut customer = Customer::new(*name, now);
            customer.email = Some(email.to_string());
            customer.phone = Some(format!("(555) 010-{:04}", n * 7));
            customer.loyalty_points = (n as i64) * 40;
            customer
        })
        .collect();

    db.categories().set_all(categories).await?;
    let generated = db.products().append(products).await?;
    db.customers().append(customers).await?;

    let summary = SeedSummary {
        products: generated,
        categories: db.categories().len(),
        customers: db.customers().len(),
        low_stock: db.products().low_stock().len(),
    };
    info!(?summary, "Demo data written");
    Ok(Some(summary))
}

fn generate_product(
    code: &str,
    name: &str,
    size: &str,
    price_addon: i64,
    n: usize,
    category_id: &str,
    now: DateTime<Utc>,
) -> Product {
    let compact: String = name.chars().filter(|c| c.is_alphanumeric()).take(3).collect();
    let sku = format!("{}-{}-{:03}", code, compact.to_uppercase(), n);

    // $1.99 - $8.99 plus the size add-on
    let price_cents = 199 + ((n * 17) % 700) as i64 + price_addon;

    let mut product = Product::new(format!("{} {}", name, size), sku, price_cents, now);
    product.category_id = category_id.to_string();
    product.barcode = format!("590{:010}", n);
    // cost 60-79% of price
    product.cost_cents = price_cents * (60 + (n % 20) as i64) / 100;
    product.quantity = (n % 41) as i64;
    product
}
