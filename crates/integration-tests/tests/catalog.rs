//! Integration tests for shops, price-list import, and catalog constraints.
//!
//! These tests require a disposable `PostgreSQL` database reachable via
//! `TEST_DATABASE_URL`. Run with:
//!
//! ```bash
//! cargo test -p orderhub-integration-tests -- --ignored --test-threads=1
//! ```

#![allow(clippy::unwrap_used)]

use orderhub_core::{Price, ShopId, UserRole};
use orderhub_db::db::RepositoryError;
use orderhub_db::db::catalog::{CatalogRepository, OfferFacts};
use orderhub_db::db::shops::ShopRepository;
use orderhub_db::db::users::UserRepository;
use orderhub_db::models::NewUser;
use orderhub_db::services::import::{ImportError, ImportService, PriceList};
use orderhub_integration_tests::TestDb;

async fn seed_shop(pool: &sqlx::PgPool, name: &str, working: bool) -> ShopId {
    let shops = ShopRepository::new(pool);
    let shop = shops.create(name, None, None).await.unwrap();
    if working {
        shops.set_working(shop.id, true).await.unwrap();
    }
    shop.id
}

fn hammer_price_list(quantity: i32, price: i64) -> PriceList {
    serde_json::from_value(serde_json::json!({
        "categories": [
            {"id": 10, "name": "Hand tools"}
        ],
        "goods": [
            {
                "id": 501,
                "category": 10,
                "name": "Hammer",
                "price": price,
                "price_rrc": price + 500,
                "quantity": quantity,
                "parameters": {"Color": "Red"}
            }
        ]
    }))
    .unwrap()
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_import_creates_categories_products_and_offers() {
    let db = TestDb::new().await;
    let shop_id = seed_shop(&db.pool, "Acme", true).await;
    let import = ImportService::new(&db.pool);
    let catalog = CatalogRepository::new(&db.pool);
    let shops = ShopRepository::new(&db.pool);

    let summary = import
        .import(shop_id, &hammer_price_list(10, 1500))
        .await
        .unwrap();
    assert_eq!(summary.categories, 1);
    assert_eq!(summary.offers, 1);
    assert_eq!(summary.parameters, 1);

    let categories = shops.list_categories(shop_id).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Hand tools");

    let offers = catalog.list_shop_offers(shop_id).await.unwrap();
    assert_eq!(offers.len(), 1);
    let offer = &offers[0];
    assert_eq!(offer.supplier_id, 501);
    assert_eq!(offer.quantity, 10);
    assert_eq!(offer.price, Price::from_minor(1500));
    assert!(offer.available);

    let params = catalog.list_product_parameters(offer.id).await.unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].value, "Red");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_reimport_updates_offer_in_place() {
    let db = TestDb::new().await;
    let shop_id = seed_shop(&db.pool, "Acme", true).await;
    let import = ImportService::new(&db.pool);
    let catalog = CatalogRepository::new(&db.pool);

    import.import(shop_id, &hammer_price_list(10, 1500)).await.unwrap();
    import.import(shop_id, &hammer_price_list(4, 1800)).await.unwrap();

    let offers = catalog.list_shop_offers(shop_id).await.unwrap();
    assert_eq!(offers.len(), 1, "re-import must not duplicate the offer");
    assert_eq!(offers[0].quantity, 4);
    assert_eq!(offers[0].price, Price::from_minor(1800));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_import_gated_on_working_shop() {
    let db = TestDb::new().await;
    let shop_id = seed_shop(&db.pool, "Closed", false).await;
    let import = ImportService::new(&db.pool);

    let err = import
        .import(shop_id, &hammer_price_list(10, 1500))
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::ShopNotWorking));

    let err = import
        .import(ShopId::new(9999), &hammer_price_list(10, 1500))
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::ShopNotFound));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_import_rejects_unknown_category_reference() {
    let db = TestDb::new().await;
    let shop_id = seed_shop(&db.pool, "Acme", true).await;
    let import = ImportService::new(&db.pool);

    let doc: PriceList = serde_json::from_value(serde_json::json!({
        "categories": [{"id": 1, "name": "Tools"}],
        "goods": [
            {"id": 2, "category": 42, "name": "Orphan", "price": 100,
             "price_rrc": 100, "quantity": 1}
        ]
    }))
    .unwrap();

    let err = import.import(shop_id, &doc).await.unwrap_err();
    assert!(matches!(err, ImportError::UnknownCategory(42)));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_offer_triple_unique_per_shop_and_supplier() {
    let db = TestDb::new().await;
    let shop_a = seed_shop(&db.pool, "Shop A", true).await;
    let shop_b = seed_shop(&db.pool, "Shop B", true).await;
    let catalog = CatalogRepository::new(&db.pool);

    let category = catalog.create_category("Tools").await.unwrap();
    let product = catalog.create_product("Hammer", category.id).await.unwrap();
    let facts = OfferFacts {
        quantity: 5,
        price: Price::from_minor(1000),
        price_rrc: Price::from_minor(1200),
        available: true,
    };

    catalog
        .insert_product_info(product.id, shop_a, 7, facts)
        .await
        .unwrap();

    // Same triple again is a conflict.
    let err = catalog
        .insert_product_info(product.id, shop_a, 7, facts)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    // A different supplier id, or a different shop, is a separate offer.
    catalog
        .insert_product_info(product.id, shop_a, 8, facts)
        .await
        .unwrap();
    catalog
        .insert_product_info(product.id, shop_b, 7, facts)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_parameter_names_global_but_values_per_offer() {
    let db = TestDb::new().await;
    let shop_a = seed_shop(&db.pool, "Shop A", true).await;
    let shop_b = seed_shop(&db.pool, "Shop B", true).await;
    let catalog = CatalogRepository::new(&db.pool);

    let category = catalog.create_category("Tools").await.unwrap();
    let product = catalog.create_product("Hammer", category.id).await.unwrap();
    let facts = OfferFacts {
        quantity: 1,
        price: Price::from_minor(100),
        price_rrc: Price::from_minor(100),
        available: true,
    };
    let offer_a = catalog
        .insert_product_info(product.id, shop_a, 1, facts)
        .await
        .unwrap();
    let offer_b = catalog
        .insert_product_info(product.id, shop_b, 1, facts)
        .await
        .unwrap();

    let color = catalog.create_parameter("Color").await.unwrap();
    let err = catalog.create_parameter("Color").await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    let same = catalog.get_or_create_parameter("Color").await.unwrap();
    assert_eq!(same.id, color.id);

    // Two shops describe the same product differently.
    catalog
        .set_product_parameter(offer_a.id, color.id, "Red")
        .await
        .unwrap();
    catalog
        .set_product_parameter(offer_b.id, color.id, "Blue")
        .await
        .unwrap();

    let a = catalog.list_product_parameters(offer_a.id).await.unwrap();
    let b = catalog.list_product_parameters(offer_b.id).await.unwrap();
    assert_eq!(a[0].value, "Red");
    assert_eq!(b[0].value, "Blue");

    // Setting again overwrites instead of duplicating.
    catalog
        .set_product_parameter(offer_a.id, color.id, "Green")
        .await
        .unwrap();
    let a = catalog.list_product_parameters(offer_a.id).await.unwrap();
    assert_eq!(a.len(), 1);
    assert_eq!(a[0].value, "Green");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_unlinking_category_leaves_catalog_and_other_shops_intact() {
    let db = TestDb::new().await;
    let shop_a = seed_shop(&db.pool, "Shop A", true).await;
    let shop_b = seed_shop(&db.pool, "Shop B", true).await;
    let catalog = CatalogRepository::new(&db.pool);
    let shops = ShopRepository::new(&db.pool);

    let category = catalog.create_category("Tools").await.unwrap();
    catalog.create_product("Hammer", category.id).await.unwrap();
    shops.add_category(shop_a, category.id).await.unwrap();
    shops.add_category(shop_b, category.id).await.unwrap();

    shops.remove_category(shop_a, category.id).await.unwrap();

    assert!(shops.list_categories(shop_a).await.unwrap().is_empty());

    // Only the link goes; the category, its products, and the other shop's
    // membership all survive.
    let b_categories = shops.list_categories(shop_b).await.unwrap();
    assert_eq!(b_categories.len(), 1);
    assert_eq!(b_categories[0].id, category.id);
    assert!(catalog.find_category("Tools").await.unwrap().is_some());
    assert_eq!(catalog.list_products(category.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_manager_runs_at_most_one_shop() {
    let db = TestDb::new().await;
    let users = UserRepository::new(&db.pool);
    let shops = ShopRepository::new(&db.pool);

    let manager = users
        .create(&NewUser {
            email: "manager@example.com".parse().unwrap(),
            password_hash: "$argon2id$fake".to_owned(),
            role: UserRole::Shop,
            company: String::new(),
            position: String::new(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
        })
        .await
        .unwrap();

    let first = shops.create("First", None, Some(manager.id)).await.unwrap();
    let err = shops
        .create("Second", None, Some(manager.id))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    assert_eq!(
        shops.get_by_manager(manager.id).await.unwrap().unwrap().id,
        first.id
    );
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_deleting_shop_cascades_to_offers_but_keeps_catalog() {
    let db = TestDb::new().await;
    let shop_id = seed_shop(&db.pool, "Acme", true).await;
    let import = ImportService::new(&db.pool);
    let catalog = CatalogRepository::new(&db.pool);
    let shops = ShopRepository::new(&db.pool);

    import.import(shop_id, &hammer_price_list(10, 1500)).await.unwrap();
    let offer = catalog.list_shop_offers(shop_id).await.unwrap()[0].clone();

    assert!(shops.delete(shop_id).await.unwrap());

    assert!(catalog.get_product_info(offer.id).await.unwrap().is_none());
    // The shared taxonomy survives the tenant.
    let category = catalog.find_category("Hand tools").await.unwrap().unwrap();
    let products = catalog.list_products(category.id).await.unwrap();
    assert_eq!(products.len(), 1);
}
