//! End-to-end back-office workflows against an in-memory database.

use chrono::{Duration, Utc};

use till_admin::commands::{analytics, catalog, checkout, data, inventory, returns};
use till_admin::error::ErrorCode;
use till_admin::state::CartState;
use till_core::inventory::StockAdjustment;
use till_core::{
    Customer, InventoryLogType, ItemCondition, PaymentMethod, Product, RefundMethod, ReturnItem,
    ReturnReason, ReturnStatus,
};
use till_db::{Database, DbConfig};

async fn open() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn stocked_product(db: &Database, name: &str, price_cents: i64, quantity: i64) -> Product {
    let mut product = Product::new(name, name.to_uppercase(), price_cents, Utc::now());
    product.quantity = quantity;
    db.products().add(product).await.unwrap()
}

#[tokio::test]
async fn checkout_writes_sale_stock_and_loyalty() {
    let db = open().await;
    let cart = CartState::new();
    let lamp = stocked_product(&db, "Lamp", 1000, 5).await;
    let ada = db.customers().add(Customer::new("Ada", Utc::now())).await.unwrap();

    for _ in 0..3 {
        checkout::add_to_cart(&db, &cart, &lamp.id).unwrap();
    }
    let view = checkout::get_cart(&cart);
    assert_eq!(view.totals.subtotal_cents, 3000);
    assert_eq!(view.totals.tax_cents, 210);

    let receipt = checkout::checkout(
        &db,
        &cart,
        checkout::CheckoutRequest {
            payment_method: Some(PaymentMethod::Cash),
            tendered_cents: Some(3000),
            customer_id: Some(ada.id.clone()),
            discount_id: Some("disc-003".into()),
            ..Default::default()
        },
        Utc::now() + Duration::seconds(1),
    )
    .await
    .unwrap();

    // 3000 + 210 tax - 500 off
    assert_eq!(receipt.transaction.total_cents, 2710);
    assert_eq!(receipt.transaction.discount_cents, 500);
    assert_eq!(receipt.change_cents, 290);
    assert_eq!(receipt.points_earned, 27);
    assert!(receipt.transaction.transaction_number.starts_with("TXN"));

    assert!(checkout::get_cart(&cart).items.is_empty());
    assert_eq!(db.transactions().len(), 1);
    assert_eq!(db.products().require(&lamp.id).unwrap().quantity, 2);

    let logs = db.inventory_logs().for_product(&lamp.id);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].log_type, InventoryLogType::Sale);
    assert_eq!(logs[0].reference.as_deref(), Some(receipt.transaction.transaction_number.as_str()));

    let ada = db.customers().require(&ada.id).unwrap();
    assert_eq!(ada.total_spent_cents, 2710);
    assert_eq!(ada.loyalty_points, 27);
    assert_eq!(db.discounts().require("disc-003").unwrap().usage_count, 1);

    let stats = analytics::dashboard(&db);
    assert_eq!(stats.total_sales_cents, 2710);
    assert_eq!(stats.total_transactions, 1);
}

#[tokio::test]
async fn short_cash_payment_changes_nothing() {
    let db = open().await;
    let cart = CartState::new();
    let lamp = stocked_product(&db, "Lamp", 1000, 5).await;
    checkout::add_to_cart(&db, &cart, &lamp.id).unwrap();

    let err = checkout::checkout(
        &db,
        &cart,
        checkout::CheckoutRequest {
            payment_method: Some(PaymentMethod::Cash),
            tendered_cents: Some(1000),
            ..Default::default()
        },
        Utc::now(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::PaymentError);
    assert!(db.transactions().is_empty());
    assert_eq!(db.products().require(&lamp.id).unwrap().quantity, 5);
    assert_eq!(checkout::get_cart(&cart).totals.total_quantity, 1);
}

#[tokio::test]
async fn checkout_may_oversell() {
    let db = open().await;
    let cart = CartState::new();
    let lamp = stocked_product(&db, "Lamp", 1000, 1).await;
    checkout::add_to_cart(&db, &cart, &lamp.id).unwrap();
    checkout::update_cart_item(&cart, &lamp.id, 3).unwrap();

    let request = checkout::CheckoutRequest {
        payment_method: Some(PaymentMethod::Card),
        ..Default::default()
    };
    checkout::checkout(&db, &cart, request, Utc::now()).await.unwrap();

    assert_eq!(db.products().require(&lamp.id).unwrap().quantity, -2);
}

#[tokio::test]
async fn empty_cart_is_refused() {
    let db = open().await;
    let err = checkout::checkout(&db, &CartState::new(), Default::default(), Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CartError);
}

#[tokio::test]
async fn return_completion_restocks_sellable_units() {
    let db = open().await;
    let now = Utc::now();
    let lamp = stocked_product(&db, "Lamp", 2000, 4).await;

    let ret = db
        .returns()
        .create_return(
            "txn-1",
            vec![ReturnItem::new(&lamp.id, "Lamp", 2, 2000, ReturnReason::Defective)],
            None,
            None,
            now,
        )
        .await
        .unwrap();
    returns::record_inspection(&db, &ret.id, &lamp.id, 1, ItemCondition::Sellable, now)
        .await
        .unwrap();
    returns::record_inspection(&db, &ret.id, &lamp.id, 1, ItemCondition::Damaged, now)
        .await
        .unwrap();

    let approved = returns::approve_return(&db, &ret.id, None, Some("ok".into()), now)
        .await
        .unwrap();
    // 4000 less the default 10% restock fee
    assert_eq!(approved.refund_cents, 3600);

    let done = returns::complete_return(&db, &ret.id, RefundMethod::StoreCredit, now)
        .await
        .unwrap();
    assert_eq!(done.ret.status, ReturnStatus::Completed);
    assert_eq!(done.ret.restock_date, Some(now));
    assert_eq!(done.restocked.len(), 1);
    assert_eq!(done.restocked[0].log_type, InventoryLogType::Return);
    assert_eq!(db.products().require(&lamp.id).unwrap().quantity, 5);
}

#[tokio::test]
async fn stock_adjustment_never_goes_negative() {
    let db = open().await;
    let lamp = stocked_product(&db, "Lamp", 1000, 2).await;

    let err = inventory::adjust_stock(&db, &lamp.id, StockAdjustment::Remove, 3, None, Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);
    assert_eq!(db.products().require(&lamp.id).unwrap().quantity, 2);
}

#[tokio::test]
async fn csv_round_trip_between_databases() {
    let source = open().await;
    let mut lamp = stocked_product(&source, "Lamp", 1999, 7).await;
    lamp.category_id = "lighting".into();
    source.products().set_all(vec![lamp.clone()]).await.unwrap();
    let mut ada = Customer::new("Ada", Utc::now());
    ada.email = Some("ada@example.com".into());
    ada.loyalty_points = 42;
    source.customers().add(ada).await.unwrap();

    let target = open().await;
    let products = catalog::export_products(&source);
    let customers = catalog::export_customers(&source);
    assert_eq!(catalog::import_products(&target, &products, Utc::now()).await.unwrap(), 1);
    assert_eq!(catalog::import_customers(&target, &customers, Utc::now()).await.unwrap(), 1);

    let copy = target.products().by_sku(&lamp.sku).unwrap();
    assert_eq!(copy.name, "Lamp");
    assert_eq!(copy.price_cents, 1999);
    assert_eq!(copy.category_id, "lighting");
    assert_eq!(copy.quantity, 7);
    assert_ne!(copy.id, lamp.id);

    let ada = &target.customers().list()[0];
    assert_eq!(ada.email.as_deref(), Some("ada@example.com"));
    assert_eq!(ada.loyalty_points, 42);
}

#[tokio::test]
async fn backup_restores_into_fresh_database() {
    let source = open().await;
    stocked_product(&source, "Lamp", 1000, 3).await;
    source
        .customers()
        .add(Customer::new("Ada", Utc::now()))
        .await
        .unwrap();
    let text = data::export_backup(&source, Utc::now()).await.unwrap();

    let target = open().await;
    data::restore_backup(&target, &text).await.unwrap();

    assert_eq!(target.products().list(), source.products().list());
    assert_eq!(target.customers().list(), source.customers().list());

    data::clear_all_data(&target).await.unwrap();
    assert!(target.products().is_empty());
    assert_eq!(target.discounts().len(), 3);
}
