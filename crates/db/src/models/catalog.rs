//! Catalog domain types.

use serde::Serialize;

use orderhub_core::{
    CategoryId, ParameterId, Price, ProductId, ProductInfoId, ProductParameterId, ShopId, UserId,
};

/// A supplier tenant offering products through its own price list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    /// Optional link to the supplier's own site or price-list source.
    pub url: Option<String>,
    /// Optional one-to-one manager account.
    pub manager_id: Option<UserId>,
    /// Gates both price-list imports and order placement.
    pub working: bool,
}

/// A catalog category; shared across shops via a many-to-many link.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A logical product. Price and quantity are per-shop facts on
/// [`ProductInfo`], never on the product itself.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
}

/// A shop's inventory/pricing record for a product - the true unit of
/// purchase.
///
/// Unique on (product_id, shop_id, supplier_id): one shop may list the same
/// product several times only under different supplier identifiers, and each
/// shop keeps an independent row for the same product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductInfo {
    pub id: ProductInfoId,
    pub product_id: ProductId,
    pub shop_id: ShopId,
    /// Supplier-assigned identifier from the price list.
    pub supplier_id: i32,
    /// Units in stock; decremented atomically at order placement.
    pub quantity: i32,
    /// Purchase price in minor units.
    pub price: Price,
    /// Recommended retail price in minor units.
    pub price_rrc: Price,
    /// Explicit availability flag, independent of `quantity`.
    pub available: bool,
}

/// A named attribute type (e.g., "color"), globally unique by name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Parameter {
    pub id: ParameterId,
    pub name: String,
}

/// A (parameter, value) fact attached to one shop offer.
///
/// Attached to `ProductInfo`, not `Product`: two shops may describe the same
/// product with different attribute values.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductParameter {
    pub id: ProductParameterId,
    pub parameter_id: ParameterId,
    pub product_info_id: ProductInfoId,
    pub value: String,
}
