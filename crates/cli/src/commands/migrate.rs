//! Database migration command.
//!
//! Reads `DATABASE_URL` from the environment (or `.env`), connects, and
//! applies the migrations embedded in `orderhub-db`.

use orderhub_db::config::DatabaseConfig;
use orderhub_db::db::{create_pool, run_migrations};

use super::CommandError;

/// Run the database migrations.
pub async fn run() -> Result<(), CommandError> {
    let config = DatabaseConfig::from_env()?;

    tracing::info!("connecting to database");
    let pool = create_pool(&config).await?;

    run_migrations(&pool).await?;

    tracing::info!("migrations complete");
    Ok(())
}
