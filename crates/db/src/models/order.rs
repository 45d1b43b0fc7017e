//! Ordering domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use orderhub_core::{ContactId, OrderId, OrderItemId, OrderStatus, ProductInfoId, UserId};

/// A buyer's order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Delivery contact used for this order.
    pub contact_id: ContactId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A line item referencing a shop offer.
///
/// References [`crate::models::ProductInfo`], not the product, so the
/// purchased shop/price context survives catalog changes.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_info_id: ProductInfoId,
    pub quantity: i32,
}

/// A requested line item at placement time.
#[derive(Debug, Clone, Copy)]
pub struct NewOrderItem {
    pub product_info_id: ProductInfoId,
    pub quantity: i32,
}
