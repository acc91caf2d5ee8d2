//! # Catalog Stores
//!
//! Products, categories and suppliers.
//!
//! Categories and suppliers are plain collections. Products add the
//! lookups the till needs: by SKU, by scanned barcode, and the low-stock
//! list that drives reorder suggestions.
//!
//! Nothing here enforces referential integrity. Deleting a category leaves
//! its products pointing at a missing `category_id`, which the reports
//! treat as uncategorized.

use std::ops::Deref;

use tracing::debug;

use till_core::{Category, Product, Supplier};

use crate::error::DbResult;
use crate::keys;
use crate::kv::LocalStorage;
use crate::store::CollectionStore;

pub type CategoryStore = CollectionStore<Category>;
pub type SupplierStore = CollectionStore<Supplier>;

pub(crate) async fn open_categories(storage: LocalStorage) -> DbResult<CategoryStore> {
    CollectionStore::open(storage, keys::CATEGORIES, "Category").await
}

pub(crate) async fn open_suppliers(storage: LocalStorage) -> DbResult<SupplierStore> {
    CollectionStore::open(storage, keys::SUPPLIERS, "Supplier").await
}

// =============================================================================
// Products
// =============================================================================

/// The product catalog.
///
/// ## Usage
/// ```rust,ignore
/// let cola = db.products().by_barcode("5449000000996");
/// let reorder = db.products().low_stock();
/// ```
#[derive(Clone)]
pub struct ProductStore {
    inner: CollectionStore<Product>,
}

impl Deref for ProductStore {
    type Target = CollectionStore<Product>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl ProductStore {
    pub(crate) async fn open(storage: LocalStorage) -> DbResult<Self> {
        let inner = CollectionStore::open(storage, keys::PRODUCTS, "Product").await?;
        Ok(ProductStore { inner })
    }

    /// Exact SKU match.
    pub fn by_sku(&self, sku: &str) -> Option<Product> {
        self.find(|p| p.sku == sku)
    }

    /// Exact barcode match. Empty barcodes never match.
    pub fn by_barcode(&self, barcode: &str) -> Option<Product> {
        if barcode.is_empty() {
            return None;
        }
        self.find(|p| p.barcode == barcode)
    }

    /// Products at or below their reorder threshold.
    pub fn low_stock(&self) -> Vec<Product> {
        self.filter(Product::is_low_stock)
    }

    /// Active products whose name, SKU or barcode contains `query`,
    /// ignoring case. An empty query lists every active product.
    pub fn search(&self, query: &str) -> Vec<Product> {
        let query = query.trim().to_lowercase();
        debug!(query = %query, "Searching products");

        self.filter(|p| {
            p.active
                && (query.is_empty()
                    || p.name.to_lowercase().contains(&query)
                    || p.sku.to_lowercase().contains(&query)
                    || p.barcode.to_lowercase().contains(&query))
        })
    }

    pub fn in_category(&self, category_id: &str) -> Vec<Product> {
        self.filter(|p| p.category_id == category_id)
    }

    /// Appends `products` in one write (CSV import).
    pub async fn append(&self, products: Vec<Product>) -> DbResult<usize> {
        let count = products.len();
        self.modify(|items| {
            items.extend(products);
            Ok(count)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Utc;

    fn product(name: &str, sku: &str, quantity: i64) -> Product {
        let mut p = Product::new(name, sku, 199, Utc::now());
        p.quantity = quantity;
        p
    }

    #[tokio::test]
    async fn test_lookups() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();

        let mut cola = product("Coca-Cola 330ml", "COKE-330", 24);
        cola.barcode = "5449000000996".into();
        products.add(cola.clone()).await.unwrap();
        products.add(product("Pepsi 330ml", "PEPSI-330", 2)).await.unwrap();

        assert_eq!(products.by_sku("COKE-330").unwrap().id, cola.id);
        assert_eq!(products.by_barcode("5449000000996").unwrap().id, cola.id);
        assert!(products.by_barcode("").is_none());
        assert_eq!(products.search("coke").len(), 1);
        assert_eq!(products.search("330").len(), 2);
        assert_eq!(products.search("").len(), 2);
    }

    #[tokio::test]
    async fn test_low_stock_includes_threshold() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();

        let mut at_threshold = product("A", "A", 5);
        at_threshold.min_quantity = 5;
        let mut above = product("B", "B", 6);
        above.min_quantity = 5;
        products.append(vec![at_threshold, above]).await.unwrap();

        let low = products.low_stock();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].sku, "A");
    }
}
