//! Order repository.
//!
//! Order placement is a single transaction: the order row, the guarded stock
//! decrements, and the order items all commit or roll back together, so a
//! failed line never leaves a partial order behind.

use sqlx::PgPool;
use thiserror::Error;

use orderhub_core::{ContactId, OrderId, OrderStatus, Price, ProductInfoId, UserId};

use super::RepositoryError;
use crate::models::{NewOrderItem, Order, OrderItem};

const ORDER_COLUMNS: &str = "id, user_id, contact_id, status, created_at";

/// Errors specific to transactional order placement.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// An offer had less stock than the requested quantity (or went
    /// unavailable) at commit time.
    #[error("insufficient stock for offer {0}")]
    InsufficientStock(ProductInfoId),

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// An order line joined with the offer's purchase price.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct PricedItem {
    pub product_info_id: ProductInfoId,
    pub quantity: i32,
    pub price: Price,
}

/// Repository for orders and their line items.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order atomically.
    ///
    /// For each item the offer's stock is decremented with a guarded update
    /// that only matches rows with enough available quantity. Zero rows
    /// affected means insufficient stock and rolls the whole order back.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceOrderError::InsufficientStock`] naming the first offer
    /// that could not cover its quantity.
    /// Returns [`PlaceOrderError::Repository`] for database errors.
    pub async fn create_with_items(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        items: &[NewOrderItem],
    ) -> Result<(Order, Vec<OrderItem>), PlaceOrderError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO orders (user_id, contact_id, status) \
             VALUES ($1, $2, $3) \
             RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .bind(contact_id)
            .bind(OrderStatus::New)
            .fetch_one(&mut *tx)
            .await?;

        let mut order_items = Vec::with_capacity(items.len());
        for item in items {
            let result = sqlx::query(
                "UPDATE product_info \
                 SET quantity = quantity - $2 \
                 WHERE id = $1 AND available AND quantity >= $2",
            )
            .bind(item.product_info_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(PlaceOrderError::InsufficientStock(item.product_info_id));
            }

            let order_item = sqlx::query_as::<_, OrderItem>(
                "INSERT INTO order_items (order_id, product_info_id, quantity) \
                 VALUES ($1, $2, $3) \
                 RETURNING id, order_id, product_info_id, quantity",
            )
            .bind(order.id)
            .bind(item.product_info_id)
            .bind(item.quantity)
            .fetch_one(&mut *tx)
            .await?;
            order_items.push(order_item);
        }

        tx.commit().await?;

        tracing::info!(order_id = %order.id, user_id = %user_id, items = order_items.len(), "placed order");
        Ok((order, order_items))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(order)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(orders)
    }

    /// List the line items of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_info_id, quantity FROM order_items \
             WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// List an order's line items joined with their current offer price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn priced_items(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<PricedItem>, RepositoryError> {
        let items = sqlx::query_as::<_, PricedItem>(
            "SELECT oi.product_info_id, oi.quantity, pi.price FROM order_items oi \
             JOIN product_info pi ON pi.id = oi.product_info_id \
             WHERE oi.order_id = $1 ORDER BY oi.id",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Compare-and-swap the order status.
    ///
    /// The `WHERE status = $2` guard makes concurrent transitions race
    /// safely: only one of two competing updates observes the old status.
    ///
    /// # Returns
    ///
    /// Returns `true` if the row moved from `from` to `to`, `false` if the
    /// order was missing or no longer in `from`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status_guarded(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(from)
            .bind(to)
            .execute(self.pool)
            .await?;

        let moved = result.rows_affected() > 0;
        if moved {
            tracing::info!(order_id = %id, from = %from, to = %to, "order status changed");
        }
        Ok(moved)
    }
}
