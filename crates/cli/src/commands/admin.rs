//! Privileged account management.

use orderhub_db::config::DatabaseConfig;
use orderhub_db::db::create_pool;
use orderhub_db::services::{AccountService, OsTokenGenerator};

use super::CommandError;

/// Create a superuser account. Superusers are active immediately and skip
/// the email confirmation workflow.
pub async fn create_superuser(email: &str, password: &str) -> Result<(), CommandError> {
    let config = DatabaseConfig::from_env()?;
    let pool = create_pool(&config).await?;

    let generator = OsTokenGenerator;
    let accounts = AccountService::new(&pool, &generator);

    let user = accounts
        .create_superuser(email, password, None, None)
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "created superuser");
    Ok(())
}
