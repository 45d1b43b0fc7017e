//! Email-confirmation token repository.
//!
//! Tokens are single-use: consumption deletes the row and activates the
//! account in one transaction, so two racing confirmations cannot both
//! succeed.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orderhub_core::{ConfirmEmailTokenId, UserId};

use super::{RepositoryError, unique_conflict};
use crate::models::ConfirmEmailToken;

const TOKEN_COLUMNS: &str = "id, user_id, key, created_at, expires_at";

/// Repository for email-confirmation tokens.
pub struct ConfirmEmailTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ConfirmEmailTokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the key already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        key: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ConfirmEmailToken, RepositoryError> {
        let sql = format!(
            "INSERT INTO confirm_email_tokens (user_id, key, expires_at) \
             VALUES ($1, $2, $3) \
             RETURNING {TOKEN_COLUMNS}"
        );
        let token = sqlx::query_as::<_, ConfirmEmailToken>(&sql)
            .bind(user_id)
            .bind(key)
            .bind(expires_at)
            .fetch_one(self.pool)
            .await
            .map_err(|e| unique_conflict(e, "token key already exists"))?;

        tracing::info!(user_id = %user_id, "issued email-confirmation token");
        Ok(token)
    }

    /// Look up a token by its opaque key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_key(&self, key: &str) -> Result<Option<ConfirmEmailToken>, RepositoryError> {
        let sql = format!("SELECT {TOKEN_COLUMNS} FROM confirm_email_tokens WHERE key = $1");
        let token = sqlx::query_as::<_, ConfirmEmailToken>(&sql)
            .bind(key)
            .fetch_optional(self.pool)
            .await?;
        Ok(token)
    }

    /// Get the user's newest token that is still valid at `now`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<ConfirmEmailToken>, RepositoryError> {
        let sql = format!(
            "SELECT {TOKEN_COLUMNS} FROM confirm_email_tokens \
             WHERE user_id = $1 AND expires_at > $2 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        let token = sqlx::query_as::<_, ConfirmEmailToken>(&sql)
            .bind(user_id)
            .bind(now)
            .fetch_optional(self.pool)
            .await?;
        Ok(token)
    }

    /// Burn a token and activate its account in one transaction.
    ///
    /// The delete doubles as the uniqueness guard: of two racing
    /// confirmations only one sees an affected row, the other gets
    /// `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the token was already consumed
    /// or never existed.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn consume(
        &self,
        token_id: ConfirmEmailTokenId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM confirm_email_tokens WHERE id = $1 AND user_id = $2")
            .bind(token_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("UPDATE users SET is_active = TRUE, updated_at = now() WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, "confirmed email and activated account");
        Ok(())
    }

    /// Delete all expired tokens. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM confirm_email_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
