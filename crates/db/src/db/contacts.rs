//! Contact repository.

use sqlx::PgPool;

use orderhub_core::{ContactId, UserId};

use super::RepositoryError;
use crate::models::Contact;

/// Repository for shipping-contact rows.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a contact for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails (including a
    /// foreign-key violation for a nonexistent user).
    pub async fn create(
        &self,
        user_id: UserId,
        phone: &str,
        address: &str,
    ) -> Result<Contact, RepositoryError> {
        let contact = sqlx::query_as::<_, Contact>(
            "INSERT INTO contacts_user (user_id, phone, address) \
             VALUES ($1, $2, $3) \
             RETURNING id, user_id, phone, address",
        )
        .bind(user_id)
        .bind(phone)
        .bind(address)
        .fetch_one(self.pool)
        .await?;

        Ok(contact)
    }

    /// Get a contact by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ContactId) -> Result<Option<Contact>, RepositoryError> {
        let contact = sqlx::query_as::<_, Contact>(
            "SELECT id, user_id, phone, address FROM contacts_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(contact)
    }

    /// List all contacts owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Contact>, RepositoryError> {
        let contacts = sqlx::query_as::<_, Contact>(
            "SELECT id, user_id, phone, address FROM contacts_user \
             WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(contacts)
    }

    /// Delete a contact, cascading to orders that reference it.
    ///
    /// # Returns
    ///
    /// Returns `true` if the contact was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ContactId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM contacts_user WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
