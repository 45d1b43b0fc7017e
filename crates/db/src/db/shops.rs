//! Shop repository.

use sqlx::PgPool;

use orderhub_core::{CategoryId, ShopId, UserId};

use super::{RepositoryError, unique_conflict};
use crate::models::{Category, Shop};

const SHOP_COLUMNS: &str = "id, name, url, manager_id, working";

/// Repository for supplier tenants and their category links.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    /// Create a new shop repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a shop. New shops start with `working = false`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the manager already runs
    /// another shop (one-to-one constraint).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        url: Option<&str>,
        manager_id: Option<UserId>,
    ) -> Result<Shop, RepositoryError> {
        let sql = format!(
            "INSERT INTO shops (name, url, manager_id) VALUES ($1, $2, $3) \
             RETURNING {SHOP_COLUMNS}"
        );
        let shop = sqlx::query_as::<_, Shop>(&sql)
            .bind(name)
            .bind(url)
            .bind(manager_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| unique_conflict(e, "manager already runs a shop"))?;

        tracing::info!(shop_id = %shop.id, name, "created shop");
        Ok(shop)
    }

    /// Get a shop by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        let sql = format!("SELECT {SHOP_COLUMNS} FROM shops WHERE id = $1");
        let shop = sqlx::query_as::<_, Shop>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(shop)
    }

    /// Get the shop managed by a user, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_manager(&self, manager_id: UserId) -> Result<Option<Shop>, RepositoryError> {
        let sql = format!("SELECT {SHOP_COLUMNS} FROM shops WHERE manager_id = $1");
        let shop = sqlx::query_as::<_, Shop>(&sql)
            .bind(manager_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(shop)
    }

    /// Set the `working` flag gating imports and order placement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_working(&self, id: ShopId, working: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shops SET working = $2 WHERE id = $1")
            .bind(id)
            .bind(working)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::info!(shop_id = %id, working, "set shop working flag");
        Ok(())
    }

    /// Link a shop to a category. Additive and idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails (including a
    /// foreign-key violation for a nonexistent shop or category).
    pub async fn add_category(
        &self,
        shop_id: ShopId,
        category_id: CategoryId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO categories_shops (category_id, shop_id) VALUES ($1, $2) \
             ON CONFLICT (category_id, shop_id) DO NOTHING",
        )
        .bind(category_id)
        .bind(shop_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Unlink a shop from a category.
    ///
    /// Deletes neither the category nor its products from other shops.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_category(
        &self,
        shop_id: ShopId,
        category_id: CategoryId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM categories_shops WHERE category_id = $1 AND shop_id = $2")
            .bind(category_id)
            .bind(shop_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// List the categories a shop offers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self, shop_id: ShopId) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT c.id, c.name FROM categories c \
             JOIN categories_shops cs ON cs.category_id = c.id \
             WHERE cs.shop_id = $1 ORDER BY c.name",
        )
        .bind(shop_id)
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    /// Delete a shop, cascading to its offers and their order items.
    ///
    /// # Returns
    ///
    /// Returns `true` if the shop was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ShopId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shops WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
