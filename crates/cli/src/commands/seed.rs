//! Demo data seeding.
//!
//! Walks the whole happy path with the real services: registers a supplier
//! and a buyer, confirms both emails, opens a shop, imports a small price
//! list, and places one order. Useful for poking at a fresh database.

use orderhub_core::UserRole;
use orderhub_db::config::DatabaseConfig;
use orderhub_db::db::create_pool;
use orderhub_db::db::catalog::CatalogRepository;
use orderhub_db::db::contacts::ContactRepository;
use orderhub_db::db::shops::ShopRepository;
use orderhub_db::models::NewOrderItem;
use orderhub_db::services::{
    AccountService, ImportService, OrderService, OsTokenGenerator, PriceList,
    accounts::Registration,
};

use super::CommandError;

/// Seed the database with a demo supplier, buyer, catalog, and order.
pub async fn run() -> Result<(), CommandError> {
    let config = DatabaseConfig::from_env()?;
    let pool = create_pool(&config).await?;

    let generator = OsTokenGenerator;
    let accounts = AccountService::new(&pool, &generator);
    let shops = ShopRepository::new(&pool);
    let contacts = ContactRepository::new(&pool);
    let import = ImportService::new(&pool);
    let orders = OrderService::new(&pool);

    // Supplier side: account, shop, price list.
    let supplier = accounts
        .register(Registration {
            email: "supplier@acme.example",
            password: "acme-demo-password",
            role: UserRole::Shop,
            company: "Acme Tools",
            position: "Sales",
        })
        .await?;
    let token = accounts.issue_confirmation(supplier.id).await?;
    accounts.confirm_email(&token.key).await?;

    let shop = shops.create("Acme Tools", None, Some(supplier.id)).await?;
    shops.set_working(shop.id, true).await?;

    let price_list: PriceList = serde_json::from_str(demo_price_list())?;
    let summary = import.import(shop.id, &price_list).await?;
    tracing::info!(
        categories = summary.categories,
        offers = summary.offers,
        "imported demo price list"
    );

    // Buyer side: account, contact, order.
    let buyer = accounts
        .register(Registration {
            email: "buyer@example.com",
            password: "buyer-demo-password",
            role: UserRole::Buyer,
            company: "Example Corp",
            position: "Procurement",
        })
        .await?;
    let token = accounts.issue_confirmation(buyer.id).await?;
    accounts.confirm_email(&token.key).await?;

    let contact = contacts
        .create(buyer.id, "+1 555 0100", "1 Demo Street")
        .await?;

    let offers = CatalogRepository::new(&pool).list_shop_offers(shop.id).await?;
    if let Some(offer) = offers.first() {
        let (order, items) = orders
            .place_order(
                buyer.id,
                contact.id,
                &[NewOrderItem {
                    product_info_id: offer.id,
                    quantity: 2,
                }],
            )
            .await?;
        tracing::info!(order_id = %order.id, items = items.len(), "placed demo order");
    }

    tracing::info!("seed complete");
    Ok(())
}

const fn demo_price_list() -> &'static str {
    r#"{
        "categories": [
            {"id": 1, "name": "Hand tools"},
            {"id": 2, "name": "Power tools"}
        ],
        "goods": [
            {
                "id": 1001,
                "category": 1,
                "name": "Claw hammer",
                "price": 1500,
                "price_rrc": 1990,
                "quantity": 10,
                "parameters": {"Weight (g)": 450, "Handle": "Fiberglass"}
            },
            {
                "id": 1002,
                "category": 1,
                "name": "Screwdriver set",
                "price": 2400,
                "price_rrc": 2990,
                "quantity": 25,
                "parameters": {"Pieces": 12}
            },
            {
                "id": 2001,
                "category": 2,
                "name": "Cordless drill",
                "price": 7900,
                "price_rrc": 9990,
                "quantity": 5,
                "parameters": {"Voltage (V)": 18, "Color": "Blue"}
            }
        ]
    }"#
}
