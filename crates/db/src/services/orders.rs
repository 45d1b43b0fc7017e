//! Order service.
//!
//! Validates the basket against the catalog, then hands the atomic write to
//! the order repository. Status transitions are checked against the
//! lifecycle before the guarded database update runs.

use sqlx::PgPool;
use thiserror::Error;

use orderhub_core::{ContactId, OrderId, OrderStatus, Price, ProductInfoId, UserId};

use crate::db::RepositoryError;
use crate::db::catalog::CatalogRepository;
use crate::db::contacts::ContactRepository;
use crate::db::orders::{OrderRepository, PlaceOrderError};
use crate::db::shops::ShopRepository;
use crate::models::{NewOrderItem, Order, OrderItem};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Malformed basket (empty, or a non-positive quantity).
    #[error("invalid order: {0}")]
    Validation(String),

    /// Shipping contact missing or owned by someone else.
    #[error("contact not found")]
    ContactNotFound,

    /// Order not found.
    #[error("order not found")]
    OrderNotFound,

    /// Referenced offer doesn't exist.
    #[error("offer {0} not found")]
    ProductNotFound(ProductInfoId),

    /// Offer belongs to a shop that is not accepting orders.
    #[error("shop for offer {0} is not working")]
    ShopNotWorking(ProductInfoId),

    /// Offer is marked unavailable.
    #[error("offer {0} is unavailable")]
    Unavailable(ProductInfoId),

    /// Offer had less stock than requested at commit time.
    #[error("insufficient stock for offer {0}")]
    InsufficientStock(ProductInfoId),

    /// Requested status change is not a legal lifecycle step.
    #[error("illegal status transition {from} -> {to}")]
    IllegalTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<PlaceOrderError> for OrderError {
    fn from(e: PlaceOrderError) -> Self {
        match e {
            PlaceOrderError::InsufficientStock(id) => Self::InsufficientStock(id),
            PlaceOrderError::Repository(other) => Self::Repository(other),
        }
    }
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    contacts: ContactRepository<'a>,
    catalog: CatalogRepository<'a>,
    shops: ShopRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            contacts: ContactRepository::new(pool),
            catalog: CatalogRepository::new(pool),
            shops: ShopRepository::new(pool),
        }
    }

    /// Place an order for a user's basket.
    ///
    /// Checks that run before the transaction are advisory; the stock guard
    /// inside [`OrderRepository::create_with_items`] is what actually
    /// prevents overselling under concurrency.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for an empty basket or non-positive
    /// quantities, `OrderError::ContactNotFound` if the contact isn't owned
    /// by the user, and per-offer errors for missing, unavailable, or
    /// out-of-stock goods.
    pub async fn place_order(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        items: &[NewOrderItem],
    ) -> Result<(Order, Vec<OrderItem>), OrderError> {
        if items.is_empty() {
            return Err(OrderError::Validation("order has no items".to_owned()));
        }
        for item in items {
            if item.quantity <= 0 {
                return Err(OrderError::Validation(format!(
                    "quantity for offer {} must be positive",
                    item.product_info_id
                )));
            }
        }

        let contact = self
            .contacts
            .get(contact_id)
            .await?
            .ok_or(OrderError::ContactNotFound)?;
        if contact.user_id != user_id {
            return Err(OrderError::ContactNotFound);
        }

        for item in items {
            let info = self
                .catalog
                .get_product_info(item.product_info_id)
                .await?
                .ok_or(OrderError::ProductNotFound(item.product_info_id))?;
            if !info.available {
                return Err(OrderError::Unavailable(item.product_info_id));
            }
            let shop = self
                .shops
                .get(info.shop_id)
                .await?
                .ok_or(OrderError::ProductNotFound(item.product_info_id))?;
            if !shop.working {
                return Err(OrderError::ShopNotWorking(item.product_info_id));
            }
        }

        let placed = self
            .orders
            .create_with_items(user_id, contact_id, items)
            .await?;
        Ok(placed)
    }

    /// Get an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order doesn't exist.
    pub async fn get_order(&self, id: OrderId) -> Result<(Order, Vec<OrderItem>), OrderError> {
        let order = self.orders.get(id).await?.ok_or(OrderError::OrderNotFound)?;
        let items = self.orders.items(id).await?;
        Ok((order, items))
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        let orders = self.orders.list_for_user(user_id).await?;
        Ok(orders)
    }

    /// Sum an order's lines at current offer prices.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order doesn't exist.
    /// Returns `OrderError::Repository` with a data-corruption message if the
    /// total overflows.
    pub async fn order_total(&self, id: OrderId) -> Result<Price, OrderError> {
        if self.orders.get(id).await?.is_none() {
            return Err(OrderError::OrderNotFound);
        }

        let mut total = Price::ZERO;
        for line in self.orders.priced_items(id).await? {
            let line_total = line
                .price
                .checked_mul(i64::from(line.quantity))
                .and_then(|t| total.checked_add(t))
                .ok_or_else(|| {
                    RepositoryError::DataCorruption(format!("order {id} total overflows"))
                })?;
            total = line_total;
        }
        Ok(total)
    }

    /// Move an order to a new status.
    ///
    /// Legality comes from the lifecycle (one step forward, or cancel from
    /// any non-terminal status); the write itself is a compare-and-swap, so
    /// two racing transitions cannot both win.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order doesn't exist.
    /// Returns `OrderError::IllegalTransition` if the step isn't legal or the
    /// status changed underneath the caller.
    pub async fn set_status(&self, id: OrderId, to: OrderStatus) -> Result<Order, OrderError> {
        let order = self.orders.get(id).await?.ok_or(OrderError::OrderNotFound)?;
        let from = order.status;

        if !from.can_transition_to(to) {
            return Err(OrderError::IllegalTransition { from, to });
        }

        let moved = self.orders.update_status_guarded(id, from, to).await?;
        if !moved {
            // Lost a race; the caller saw a status that no longer holds.
            return Err(OrderError::IllegalTransition { from, to });
        }

        self.orders.get(id).await?.ok_or(OrderError::OrderNotFound)
    }
}
