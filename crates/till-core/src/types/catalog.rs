//! Catalog records: products, categories and suppliers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{new_id, Entity};
use crate::money::Money;

/// Reorder threshold given to products that arrive without one
/// (CSV import, quick-add forms).
pub const DEFAULT_MIN_QUANTITY: i64 = 5;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,

    /// Selling price in cents.
    pub price_cents: i64,

    /// Unit cost in cents (stock valuation).
    #[serde(default)]
    pub cost_cents: i64,

    /// Category id. May point at a deleted category.
    #[serde(default)]
    pub category_id: String,

    pub sku: String,
    #[serde(default)]
    pub barcode: String,

    /// Units on hand.
    pub quantity: i64,

    /// Reorder threshold: at or below this the product counts as low stock.
    #[serde(default)]
    pub min_quantity: i64,

    /// Preferred order size when restocking.
    #[serde(default)]
    pub reorder_quantity: Option<i64>,

    #[serde(default)]
    pub supplier_id: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    pub active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates an active product with empty optional fields and the default
    /// reorder threshold.
    pub fn new(
        name: impl Into<String>,
        sku: impl Into<String>,
        price_cents: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Product {
            id: new_id(),
            name: name.into(),
            description: String::new(),
            price_cents,
            cost_cents: 0,
            category_id: String::new(),
            sku: sku.into(),
            barcode: String::new(),
            quantity: 0,
            min_quantity: DEFAULT_MIN_QUANTITY,
            reorder_quantity: None,
            supplier_id: None,
            image: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the unit cost as Money.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// At or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }

    /// Cost value of the units on hand.
    pub fn stock_value(&self) -> Money {
        self.cost().multiply_quantity(self.quantity.max(0))
    }
}

impl Entity for Product {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

patch_struct! {
    /// Partial update for [`Product`].
    ProductPatch for Product {
        name: String,
        description: String,
        price_cents: i64,
        cost_cents: i64,
        category_id: String,
        sku: String,
        barcode: String,
        quantity: i64,
        min_quantity: i64,
        reorder_quantity: Option<i64>,
        supplier_id: Option<String>,
        image: Option<String>,
        active: bool,
    }
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Category {
            id: new_id(),
            name: name.into(),
            description: None,
            image: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Category {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

patch_struct! {
    CategoryPatch for Category {
        name: String,
        description: Option<String>,
        image: Option<String>,
        active: bool,
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Days between ordering and delivery.
    pub lead_time_days: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(name: impl Into<String>, lead_time_days: u32, now: DateTime<Utc>) -> Self {
        Supplier {
            id: new_id(),
            name: name.into(),
            email: None,
            phone: None,
            address: None,
            lead_time_days,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Supplier {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

patch_struct! {
    SupplierPatch for Supplier {
        name: String,
        email: Option<String>,
        phone: Option<String>,
        address: Option<String>,
        lead_time_days: u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_threshold_is_inclusive() {
        let mut product = Product::new("Cola", "COLA-330", 199, Utc::now());
        product.quantity = 5;
        assert!(product.is_low_stock());

        product.quantity = 6;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_stock_value_ignores_negative_quantity() {
        let mut product = Product::new("Cola", "COLA-330", 199, Utc::now());
        product.cost_cents = 120;
        product.quantity = 10;
        assert_eq!(product.stock_value().cents(), 1200);

        product.quantity = -3;
        assert_eq!(product.stock_value().cents(), 0);
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let product = Product::new("Cola", "COLA-330", 199, Utc::now());
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["priceCents"], 199);
        assert_eq!(json["minQuantity"], DEFAULT_MIN_QUANTITY);
        assert!(json.get("price_cents").is_none());
    }
}
