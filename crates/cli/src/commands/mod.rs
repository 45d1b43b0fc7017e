//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use thiserror::Error;

use orderhub_db::config::ConfigError;
use orderhub_db::db::RepositoryError;
use orderhub_db::services::{AccountError, ImportError, OrderError};

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("account error: {0}")]
    Account(#[from] AccountError),

    #[error("import error: {0}")]
    Import(#[from] ImportError),

    #[error("order error: {0}")]
    Order(#[from] OrderError),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("invalid document: {0}")]
    Document(#[from] serde_json::Error),
}
