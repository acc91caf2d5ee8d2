//! Storage keys, one per persisted collection or value.
//!
//! Backups use these same strings as the keys of their `data` object.

pub const PRODUCTS: &str = "products";
pub const CATEGORIES: &str = "categories";
pub const CUSTOMERS: &str = "customers";
pub const TRANSACTIONS: &str = "transactions";
pub const INVENTORY_LOGS: &str = "inventoryLogs";
pub const SUPPLIERS: &str = "suppliers";
pub const STORE_SETTINGS: &str = "storeSettings";
pub const DISCOUNTS: &str = "discounts";
pub const GIFT_CARDS: &str = "giftCards";
pub const VOUCHERS: &str = "vouchers";
pub const EMPLOYEES: &str = "employees";
pub const SHIFT_RECORDS: &str = "shiftRecords";
pub const RETURNS: &str = "returns";
pub const RESTOCK_RECORDS: &str = "restockRecords";
pub const REFUND_POLICIES: &str = "refundPolicies";
pub const STORE_LOCATIONS: &str = "storeLocations";
pub const SELECTED_LOCATION_ID: &str = "selectedLocationId";
pub const USERS: &str = "users";
pub const CURRENT_USER: &str = "currentUser";

/// Every key the back office owns, in backup order.
pub const ALL: [&str; 19] = [
    PRODUCTS,
    CATEGORIES,
    CUSTOMERS,
    TRANSACTIONS,
    INVENTORY_LOGS,
    SUPPLIERS,
    STORE_SETTINGS,
    DISCOUNTS,
    GIFT_CARDS,
    VOUCHERS,
    EMPLOYEES,
    SHIFT_RECORDS,
    RETURNS,
    RESTOCK_RECORDS,
    REFUND_POLICIES,
    STORE_LOCATIONS,
    SELECTED_LOCATION_ID,
    USERS,
    CURRENT_USER,
];
