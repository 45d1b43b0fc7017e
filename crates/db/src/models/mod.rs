//! Domain row types.
//!
//! Plain structs mapped 1:1 to tables via `sqlx::FromRow`. Anything with
//! validation lives behind a parsed type from `orderhub-core` (emails, roles,
//! statuses, prices), so a fetched model is always well-formed.

pub mod catalog;
pub mod order;
pub mod user;

pub use catalog::{Category, Parameter, Product, ProductInfo, ProductParameter, Shop};
pub use order::{NewOrderItem, Order, OrderItem};
pub use user::{Contact, ConfirmEmailToken, NewUser, User};
