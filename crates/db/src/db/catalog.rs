//! Catalog repository: categories, products, offers, parameters.
//!
//! The (product, shop, supplier_id) triple is the upsert key of the
//! price-list import contract: a direct insert of a duplicate triple fails
//! with a conflict, while [`CatalogRepository::upsert_product_info`] updates
//! in place.

use sqlx::PgPool;

use orderhub_core::{CategoryId, ParameterId, Price, ProductId, ProductInfoId, ShopId};

use super::{RepositoryError, unique_conflict};
use crate::models::{Category, Parameter, Product, ProductInfo, ProductParameter};

const INFO_COLUMNS: &str =
    "id, product_id, shop_id, supplier_id, quantity, price, price_rrc, available";

/// A shop offer's mutable facts, as carried by one price-list row.
#[derive(Debug, Clone, Copy)]
pub struct OfferFacts {
    pub quantity: i32,
    pub price: Price,
    pub price_rrc: Price,
    pub available: bool,
}

/// Repository for the product taxonomy and per-shop inventory facts.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Categories & products
    // =========================================================================

    /// Insert a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;
        Ok(category)
    }

    /// Find a category by exact name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_category(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;
        Ok(category)
    }

    /// Insert a product under a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails (including a
    /// foreign-key violation for a nonexistent category).
    pub async fn create_product(
        &self,
        name: &str,
        category_id: CategoryId,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, category_id) VALUES ($1, $2) \
             RETURNING id, name, category_id",
        )
        .bind(name)
        .bind(category_id)
        .fetch_one(self.pool)
        .await?;
        Ok(product)
    }

    /// Find a product by name within one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_product(
        &self,
        name: &str,
        category_id: CategoryId,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, category_id FROM products \
             WHERE name = $1 AND category_id = $2 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .bind(category_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// List the products of a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, category_id FROM products WHERE category_id = $1 ORDER BY name",
        )
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    // =========================================================================
    // Offers (product_info)
    // =========================================================================

    /// Insert a shop offer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the (product, shop,
    /// supplier_id) triple already exists - importers catch this and switch
    /// to [`Self::upsert_product_info`].
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert_product_info(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
        supplier_id: i32,
        facts: OfferFacts,
    ) -> Result<ProductInfo, RepositoryError> {
        let sql = format!(
            "INSERT INTO product_info \
             (product_id, shop_id, supplier_id, quantity, price, price_rrc, available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {INFO_COLUMNS}"
        );
        let info = sqlx::query_as::<_, ProductInfo>(&sql)
            .bind(product_id)
            .bind(shop_id)
            .bind(supplier_id)
            .bind(facts.quantity)
            .bind(facts.price)
            .bind(facts.price_rrc)
            .bind(facts.available)
            .fetch_one(self.pool)
            .await
            .map_err(|e| unique_conflict(e, "offer already exists for (product, shop, supplier_id)"))?;
        Ok(info)
    }

    /// Insert or update a shop offer on its (product, shop, supplier_id)
    /// natural key. Re-importing a price list is idempotent through this.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_product_info(
        &self,
        product_id: ProductId,
        shop_id: ShopId,
        supplier_id: i32,
        facts: OfferFacts,
    ) -> Result<ProductInfo, RepositoryError> {
        let sql = format!(
            "INSERT INTO product_info \
             (product_id, shop_id, supplier_id, quantity, price, price_rrc, available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (product_id, shop_id, supplier_id) DO UPDATE SET \
                 quantity = EXCLUDED.quantity, \
                 price = EXCLUDED.price, \
                 price_rrc = EXCLUDED.price_rrc, \
                 available = EXCLUDED.available \
             RETURNING {INFO_COLUMNS}"
        );
        let info = sqlx::query_as::<_, ProductInfo>(&sql)
            .bind(product_id)
            .bind(shop_id)
            .bind(supplier_id)
            .bind(facts.quantity)
            .bind(facts.price)
            .bind(facts.price_rrc)
            .bind(facts.available)
            .fetch_one(self.pool)
            .await?;
        Ok(info)
    }

    /// Get an offer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product_info(
        &self,
        id: ProductInfoId,
    ) -> Result<Option<ProductInfo>, RepositoryError> {
        let sql = format!("SELECT {INFO_COLUMNS} FROM product_info WHERE id = $1");
        let info = sqlx::query_as::<_, ProductInfo>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(info)
    }

    /// List all offers of a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_shop_offers(
        &self,
        shop_id: ShopId,
    ) -> Result<Vec<ProductInfo>, RepositoryError> {
        let sql =
            format!("SELECT {INFO_COLUMNS} FROM product_info WHERE shop_id = $1 ORDER BY id");
        let offers = sqlx::query_as::<_, ProductInfo>(&sql)
            .bind(shop_id)
            .fetch_all(self.pool)
            .await?;
        Ok(offers)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Insert a parameter (attribute type).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken - parameter
    /// names are globally unique.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_parameter(&self, name: &str) -> Result<Parameter, RepositoryError> {
        let parameter = sqlx::query_as::<_, Parameter>(
            "INSERT INTO parameters (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| unique_conflict(e, "parameter name already exists"))?;
        Ok(parameter)
    }

    /// Get or create a parameter by name, race-free.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create_parameter(&self, name: &str) -> Result<Parameter, RepositoryError> {
        // The no-op DO UPDATE makes RETURNING yield the existing row too.
        let parameter = sqlx::query_as::<_, Parameter>(
            "INSERT INTO parameters (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;
        Ok(parameter)
    }

    /// Attach or update a (parameter, value) fact on one shop offer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_product_parameter(
        &self,
        product_info_id: ProductInfoId,
        parameter_id: ParameterId,
        value: &str,
    ) -> Result<ProductParameter, RepositoryError> {
        let fact = sqlx::query_as::<_, ProductParameter>(
            "INSERT INTO product_parameters (parameter_id, product_info_id, value) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (parameter_id, product_info_id) DO UPDATE SET value = EXCLUDED.value \
             RETURNING id, parameter_id, product_info_id, value",
        )
        .bind(parameter_id)
        .bind(product_info_id)
        .bind(value)
        .fetch_one(self.pool)
        .await?;
        Ok(fact)
    }

    /// List the (parameter, value) facts of one shop offer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_product_parameters(
        &self,
        product_info_id: ProductInfoId,
    ) -> Result<Vec<ProductParameter>, RepositoryError> {
        let facts = sqlx::query_as::<_, ProductParameter>(
            "SELECT id, parameter_id, product_info_id, value FROM product_parameters \
             WHERE product_info_id = $1 ORDER BY id",
        )
        .bind(product_info_id)
        .fetch_all(self.pool)
        .await?;
        Ok(facts)
    }
}
