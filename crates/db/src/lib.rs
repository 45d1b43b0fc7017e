//! Orderhub data layer.
//!
//! This crate is the storage core of the B2B ordering platform: shops supply
//! products, buyers browse a catalog and place orders fulfilled against
//! per-shop inventory. It owns the schema, the per-table repositories, and
//! the small workflow services that sit directly on top of them.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven database configuration
//! - [`db`] - Connection pool, migrations, and repositories
//! - [`models`] - Domain row types
//! - [`services`] - Workflow services (accounts, price-list import, orders)
//!
//! # Invariants owned here
//!
//! - `users.email` is unique and stored normalized (case-insensitive login)
//! - `product_info` is unique on (product, shop, supplier_id); re-imports
//!   upsert on that triple instead of duplicating
//! - `parameters.name` and `confirm_email_tokens.key` are globally unique
//! - Parent deletion cascades: User -> Contact/Order -> OrderItem and
//!   Shop -> ProductInfo -> OrderItem
//! - Order placement decrements stock atomically; two concurrent orders can
//!   never oversell an offer
//!
//! Uniqueness constraints are the source of truth for conflicts: callers get
//! a typed conflict error instead of pre-checking existence.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod models;
pub mod services;
