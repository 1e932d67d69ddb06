//! End-to-end cart flows over HTTP with file persistence.
//!
//! Each test starts its own catalog server on a random port and stores the
//! cart in a fresh temporary directory, so tests run in parallel.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use rocketshoes_core::ProductId;
use rocketshoes_integration_tests::{FakeCatalog, StorageDir, load_cart, product_json};
use rocketshoes_storefront::catalog::CatalogError;
use rocketshoes_storefront::{CartError, UpdateProductAmount};
use rust_decimal::Decimal;
use serde_json::json;

const SNEAKER: i32 = 1;
const RUNNER: i32 = 2;

async fn catalog() -> FakeCatalog {
    FakeCatalog::spawn()
        .await
        .unwrap()
        .with_product(product_json(SNEAKER, "Tênis de Caminhada Leve Confortável", 179.9), 3)
        .with_product(product_json(RUNNER, "Tênis VR Caminhada Confortável", 139.9), 5)
}

fn messages(cart: &rocketshoes_integration_tests::TestCart) -> Vec<String> {
    cart.notifier()
        .notifications()
        .into_iter()
        .map(|n| n.message)
        .collect()
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_add_update_remove_round_trip() {
    let catalog = catalog().await;
    let dir = StorageDir::new().unwrap();
    let mut cart = load_cart(&catalog, &dir).await.unwrap();

    cart.add_product(ProductId::new(SNEAKER)).await.unwrap();
    cart.add_product(ProductId::new(RUNNER)).await.unwrap();
    cart.add_product(ProductId::new(SNEAKER)).await.unwrap();

    let stored = dir.stored_cart().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0]["id"], json!(SNEAKER));
    assert_eq!(stored[0]["amount"], json!(2));
    assert_eq!(stored[1]["id"], json!(RUNNER));
    assert_eq!(stored[1]["amount"], json!(1));

    cart.update_product_amount(UpdateProductAmount::new(ProductId::new(RUNNER), 4))
        .await
        .unwrap();
    assert_eq!(cart.cart().item_count(), 6);
    assert_eq!(cart.cart().subtotal(), Decimal::new(9194, 1));

    cart.remove_product(ProductId::new(SNEAKER)).await.unwrap();

    let stored = dir.stored_cart().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["id"], json!(RUNNER));
    assert_eq!(stored[0]["amount"], json!(4));

    assert!(cart.notifier().notifications().is_empty());
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let catalog = catalog().await;
    let dir = StorageDir::new().unwrap();

    {
        let mut cart = load_cart(&catalog, &dir).await.unwrap();
        cart.add_product(ProductId::new(SNEAKER)).await.unwrap();
        cart.add_product(ProductId::new(SNEAKER)).await.unwrap();
    }

    let restored = load_cart(&catalog, &dir).await.unwrap();
    let entry = restored.cart().get(ProductId::new(SNEAKER)).unwrap();
    assert_eq!(entry.amount, 2);
    assert_eq!(entry.product.title, "Tênis de Caminhada Leve Confortável");
    assert_eq!(entry.product.price, Some(Decimal::new(1799, 1)));
}

#[tokio::test]
async fn test_stored_entries_are_flat_and_keep_extra_fields() {
    let catalog = FakeCatalog::spawn().await.unwrap().with_product(
        json!({
            "id": 7,
            "title": "Tênis Nike Revolution",
            "price": 199.9,
            "image": "https://cdn.rocketshoes.test/7.jpg",
            "brand": "Nike",
            "sizes": [38, 39, 40]
        }),
        2,
    );
    let dir = StorageDir::new().unwrap();
    let mut cart = load_cart(&catalog, &dir).await.unwrap();

    cart.add_product(ProductId::new(7)).await.unwrap();

    let stored = dir.stored_cart().unwrap();
    assert_eq!(
        stored[0],
        json!({
            "id": 7,
            "title": "Tênis Nike Revolution",
            "price": 199.9,
            "image": "https://cdn.rocketshoes.test/7.jpg",
            "brand": "Nike",
            "sizes": [38, 39, 40],
            "amount": 1
        })
    );
}

#[tokio::test]
async fn test_product_without_image_is_added_and_restored() {
    let catalog = FakeCatalog::spawn().await.unwrap().with_product(
        json!({ "id": 9, "title": "Meia Esportiva", "price": 19.9 }),
        4,
    );
    let dir = StorageDir::new().unwrap();

    {
        let mut cart = load_cart(&catalog, &dir).await.unwrap();
        cart.add_product(ProductId::new(9)).await.unwrap();
        assert!(cart.notifier().notifications().is_empty());
    }

    assert_eq!(
        dir.stored_cart().unwrap()[0],
        json!({ "id": 9, "title": "Meia Esportiva", "price": 19.9, "amount": 1 })
    );

    let restored = load_cart(&catalog, &dir).await.unwrap();
    let entry = restored.cart().get(ProductId::new(9)).unwrap();
    assert_eq!(entry.amount, 1);
    assert!(entry.product.image.is_empty());
    assert_eq!(restored.cart().subtotal(), Decimal::new(199, 1));
}

// ============================================================================
// Catalog interaction
// ============================================================================

#[tokio::test]
async fn test_stock_is_fetched_every_time_but_product_is_cached() {
    let catalog = catalog().await;
    let dir = StorageDir::new().unwrap();
    let mut cart = load_cart(&catalog, &dir).await.unwrap();

    cart.add_product(ProductId::new(SNEAKER)).await.unwrap();
    cart.add_product(ProductId::new(SNEAKER)).await.unwrap();
    cart.update_product_amount(UpdateProductAmount::new(ProductId::new(SNEAKER), 1))
        .await
        .unwrap();

    assert_eq!(catalog.stock_hits(), 3);
    assert_eq!(catalog.product_hits(), 1);
}

#[tokio::test]
async fn test_stock_change_between_operations_is_seen() {
    let catalog = catalog().await;
    let dir = StorageDir::new().unwrap();
    let mut cart = load_cart(&catalog, &dir).await.unwrap();

    cart.add_product(ProductId::new(SNEAKER)).await.unwrap();
    catalog.set_stock(SNEAKER, 1);

    let err = cart.add_product(ProductId::new(SNEAKER)).await.unwrap_err();
    assert!(matches!(
        err,
        CartError::StockExceeded {
            requested: 2,
            available: 1,
            ..
        }
    ));
    assert_eq!(messages(&cart), ["Requested quantity exceeds stock"]);
    assert_eq!(dir.stored_cart().unwrap()[0]["amount"], json!(1));
}

#[tokio::test]
async fn test_unknown_product_is_reported() {
    let catalog = catalog().await;
    let dir = StorageDir::new().unwrap();
    let mut cart = load_cart(&catalog, &dir).await.unwrap();

    let err = cart.add_product(ProductId::new(404)).await.unwrap_err();

    assert!(matches!(err, CartError::Catalog(CatalogError::NotFound(id)) if id == ProductId::new(404)));
    assert_eq!(messages(&cart), ["Error adding product"]);
    assert!(cart.cart().is_empty());
    assert!(dir.stored_cart().is_none());
}

#[tokio::test]
async fn test_catalog_outage_leaves_cart_untouched() {
    let catalog = catalog().await;
    let dir = StorageDir::new().unwrap();
    let mut cart = load_cart(&catalog, &dir).await.unwrap();
    cart.add_product(ProductId::new(SNEAKER)).await.unwrap();

    catalog.fail_stock_with(Some(StatusCode::SERVICE_UNAVAILABLE));

    let err = cart
        .update_product_amount(UpdateProductAmount::new(ProductId::new(SNEAKER), 2))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CartError::Catalog(CatalogError::Api { status: 503, ref message }) if message == "stock service unavailable"
    ));
    assert_eq!(messages(&cart), ["Error changing product quantity"]);
    assert_eq!(cart.cart().get(ProductId::new(SNEAKER)).unwrap().amount, 1);

    catalog.fail_stock_with(None);
    cart.update_product_amount(UpdateProductAmount::new(ProductId::new(SNEAKER), 2))
        .await
        .unwrap();
    assert_eq!(dir.stored_cart().unwrap()[0]["amount"], json!(2));
}

// ============================================================================
// Rejected requests
// ============================================================================

#[tokio::test]
async fn test_update_rejections_keep_stored_cart() {
    let catalog = catalog().await;
    let dir = StorageDir::new().unwrap();
    let mut cart = load_cart(&catalog, &dir).await.unwrap();
    cart.add_product(ProductId::new(SNEAKER)).await.unwrap();
    let before = dir.stored_cart().unwrap();

    let over_stock = cart
        .update_product_amount(UpdateProductAmount::new(ProductId::new(SNEAKER), 4))
        .await
        .unwrap_err();
    assert!(matches!(over_stock, CartError::StockExceeded { .. }));

    let zero = cart
        .update_product_amount(UpdateProductAmount::new(ProductId::new(SNEAKER), 0))
        .await
        .unwrap_err();
    assert!(matches!(zero, CartError::InvalidAmount(0)));

    let missing = cart
        .update_product_amount(UpdateProductAmount::new(ProductId::new(RUNNER), 1))
        .await
        .unwrap_err();
    assert!(matches!(missing, CartError::NotFound(_)));

    assert_eq!(
        messages(&cart),
        [
            "Requested quantity exceeds stock",
            "Error changing product quantity",
            "Error changing product quantity",
        ]
    );
    assert_eq!(dir.stored_cart().unwrap(), before);
}

#[tokio::test]
async fn test_remove_missing_product() {
    let catalog = catalog().await;
    let dir = StorageDir::new().unwrap();
    let mut cart = load_cart(&catalog, &dir).await.unwrap();

    let err = cart.remove_product(ProductId::new(SNEAKER)).await.unwrap_err();

    assert!(matches!(err, CartError::NotFound(_)));
    assert_eq!(messages(&cart), ["Error removing product"]);
    assert!(dir.stored_cart().is_none());
}

#[tokio::test]
async fn test_corrupt_storage_loads_empty_and_is_replaced() {
    let catalog = catalog().await;
    let dir = StorageDir::new().unwrap();
    std::fs::write(dir.path(), "{ not json").unwrap();

    let mut cart = load_cart(&catalog, &dir).await.unwrap();
    assert!(cart.cart().is_empty());

    cart.add_product(ProductId::new(RUNNER)).await.unwrap();
    assert_eq!(dir.stored_cart().unwrap()[0]["id"], json!(RUNNER));
}
