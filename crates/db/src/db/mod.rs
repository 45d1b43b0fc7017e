//! Connection pool, migrations, and repositories.
//!
//! ## Tables
//!
//! - `users`, `contacts_user`, `confirm_email_tokens` - identity
//! - `shops`, `categories`, `categories_shops`, `products`, `product_info`,
//!   `parameters`, `product_parameters` - catalog
//! - `orders`, `order_items` - ordering
//!
//! # Migrations
//!
//! Migrations are embedded from `crates/db/migrations/` and run via:
//! ```bash
//! cargo run -p orderhub-cli -- migrate
//! ```

pub mod catalog;
pub mod contacts;
pub mod orders;
pub mod shops;
pub mod tokens;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::config::DatabaseConfig;

pub use catalog::CatalogRepository;
pub use contacts::ContactRepository;
pub use orders::{OrderRepository, PlaceOrderError, PricedItem};
pub use shops::ShopRepository;
pub use tokens::ConfirmEmailTokenRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`] with
/// the given message; anything else stays a database error.
pub(crate) fn unique_conflict(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(config.database_url.expose_secret())
        .await
}

/// Run the embedded schema migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("running database migrations");
    sqlx::migrate!("./migrations").run(pool).await
}
