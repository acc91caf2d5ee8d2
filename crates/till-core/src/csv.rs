//! # CSV Import / Export
//!
//! Spreadsheet exchange for products and customers.
//!
//! ## Formats
//! ```text
//! products.csv    Name,Price,SKU,CategoryId,Quantity,Image
//!                 Cola,1.99,COLA-330,drinks,24,
//!
//! customers.csv   Name,Email,Phone,Address,City,Postal Code,Total Spent,Loyalty Points,Created Date
//!                 "Ada","ada@x.io","","","","","120.50","42","2024-03-04"
//! ```
//!
//! ## Parsing Rules
//! - Rows are split on bare commas. There is no quote escaping, so a comma
//!   inside a value shifts every column after it.
//! - Columns are found by header name; missing columns read as empty.
//! - Blank lines are skipped.
//! - Customer cells are written wrapped in double quotes, which import
//!   strips again.
//! - Prices are decimal currency units and are rounded to cents.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Customer, Product};

pub const PRODUCT_CSV_HEADER: [&str; 6] = ["Name", "Price", "SKU", "CategoryId", "Quantity", "Image"];

pub const CUSTOMER_CSV_HEADER: [&str; 9] = [
    "Name",
    "Email",
    "Phone",
    "Address",
    "City",
    "Postal Code",
    "Total Spent",
    "Loyalty Points",
    "Created Date",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Products
// =============================================================================

pub fn export_products(products: &[Product]) -> String {
    let mut lines = vec![PRODUCT_CSV_HEADER.join(",")];
    lines.extend(products.iter().map(|p| {
        [
            p.name.clone(),
            p.price().to_decimal_string(),
            p.sku.clone(),
            p.category_id.clone(),
            p.quantity.to_string(),
            p.image.clone().unwrap_or_default(),
        ]
        .join(",")
    }));
    lines.join("\n")
}

/// Parses exported (or hand-made) product rows into new products.
///
/// Every row becomes a fresh, active product with a new id, an empty
/// description and barcode, zero cost and the default reorder threshold.
/// The caller decides whether to append or replace.
pub fn import_products(text: &str, now: DateTime<Utc>) -> CoreResult<Vec<Product>> {
    let Some(table) = Table::parse(text, false) else {
        return Ok(Vec::new());
    };

    table
        .rows
        .iter()
        .map(|(line, cells)| {
            let get = |column: &str| table.cell(cells, column);

            let price = parse_money(get("Price"), *line)?;
            let quantity = parse_int(get("Quantity"), *line, "Quantity")?;

            let mut product = Product::new(get("Name"), get("SKU"), price.cents(), now);
            product.category_id = get("CategoryId").to_string();
            product.quantity = quantity;
            product.image = Some(get("Image"))
                .filter(|image| !image.is_empty())
                .map(str::to_string);
            Ok(product)
        })
        .collect()
}

// =============================================================================
// Customers
// =============================================================================

pub fn export_customers(customers: &[Customer]) -> String {
    let mut lines = vec![CUSTOMER_CSV_HEADER.join(",")];
    lines.extend(customers.iter().map(|c| {
        let cells = [
            c.name.clone(),
            c.email.clone().unwrap_or_default(),
            c.phone.clone().unwrap_or_default(),
            c.address.clone().unwrap_or_default(),
            c.city.clone().unwrap_or_default(),
            c.postal_code.clone().unwrap_or_default(),
            c.total_spent().to_decimal_string(),
            c.loyalty_points.to_string(),
            c.created_at.format(DATE_FORMAT).to_string(),
        ];
        cells
            .iter()
            .map(|cell| format!("\"{}\"", cell))
            .collect::<Vec<_>>()
            .join(",")
    }));
    lines.join("\n")
}

/// Parses a customer export back into new customer records.
///
/// A created date that does not parse falls back to `now`.
pub fn import_customers(text: &str, now: DateTime<Utc>) -> CoreResult<Vec<Customer>> {
    let Some(table) = Table::parse(text, true) else {
        return Ok(Vec::new());
    };

    table
        .rows
        .iter()
        .map(|(line, cells)| {
            let get = |column: &str| table.cell(cells, column);
            let optional = |column: &str| Some(get(column)).filter(|v| !v.is_empty()).map(str::to_string);

            let mut customer = Customer::new(get("Name"), now);
            customer.email = optional("Email");
            customer.phone = optional("Phone");
            customer.address = optional("Address");
            customer.city = optional("City");
            customer.postal_code = optional("Postal Code");
            customer.total_spent_cents = parse_money(get("Total Spent"), *line)?.cents();
            customer.loyalty_points = parse_int(get("Loyalty Points"), *line, "Loyalty Points")?;

            if let Ok(date) = NaiveDate::parse_from_str(get("Created Date"), DATE_FORMAT) {
                if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                    customer.created_at = midnight.and_utc();
                    customer.updated_at = customer.created_at;
                }
            }
            Ok(customer)
        })
        .collect()
}

// =============================================================================
// Shared parsing
// =============================================================================

/// Header index plus the non-blank rows, each tagged with its 1-based line
/// number.
struct Table {
    columns: HashMap<String, usize>,
    rows: Vec<(usize, Vec<String>)>,
}

impl Table {
    fn parse(text: &str, unquote: bool) -> Option<Table> {
        let mut lines = text.lines().enumerate();
        let (_, header) = lines.next()?;

        let split = |line: &str| -> Vec<String> {
            line.split(',')
                .map(|cell| {
                    let cell = cell.trim();
                    if unquote {
                        strip_quotes(cell).to_string()
                    } else {
                        cell.to_string()
                    }
                })
                .collect()
        };

        let columns = split(header)
            .into_iter()
            .enumerate()
            .map(|(index, name)| (name, index))
            .collect();

        let rows = lines
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| (index + 1, split(line)))
            .collect();

        Some(Table { columns, rows })
    }

    fn cell<'a>(&self, cells: &'a [String], column: &str) -> &'a str {
        self.columns
            .get(column)
            .and_then(|index| cells.get(*index))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn strip_quotes(cell: &str) -> &str {
    cell.strip_prefix('"')
        .and_then(|c| c.strip_suffix('"'))
        .unwrap_or(cell)
}

/// Empty means zero.
fn parse_money(value: &str, line: usize) -> CoreResult<Money> {
    if value.is_empty() {
        return Ok(Money::zero());
    }
    Money::parse_decimal(value).map_err(|e| CoreError::Csv {
        line,
        reason: e.to_string(),
    })
}

fn parse_int(value: &str, line: usize, column: &str) -> CoreResult<i64> {
    if value.is_empty() {
        return Ok(0);
    }
    value.parse::<i64>().map_err(|_| CoreError::Csv {
        line,
        reason: format!("{} '{}' is not a whole number", column, value),
    })
}
