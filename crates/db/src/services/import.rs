//! Price-list import service.
//!
//! A supplier uploads one document describing their categories and goods;
//! importing it is idempotent thanks to the offer upsert key, so re-sending
//! the same file refreshes quantities and prices instead of duplicating rows.

use std::collections::BTreeMap;

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use orderhub_core::{CategoryId, Price, ShopId};

use crate::db::RepositoryError;
use crate::db::catalog::{CatalogRepository, OfferFacts};
use crate::db::shops::ShopRepository;

/// Errors that can occur during a price-list import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Target shop doesn't exist.
    #[error("shop not found")]
    ShopNotFound,

    /// Target shop is not accepting imports.
    #[error("shop is not working")]
    ShopNotWorking,

    /// A good references a category id the document doesn't declare.
    #[error("unknown category id {0} in price list")]
    UnknownCategory(i32),

    /// A document field fails validation.
    #[error("invalid price list: {0}")]
    Validation(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One category declared by the price list.
///
/// The `id` is the supplier's own numbering, scoped to the document; goods
/// reference it through their `category` field.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceListCategory {
    pub id: i32,
    pub name: String,
}

/// One good (offer) in the price list.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceListItem {
    /// Supplier's external id for this good; becomes `supplier_id`.
    pub id: i32,
    /// Document-local category id.
    pub category: i32,
    pub name: String,
    /// Purchase price in minor units.
    pub price: i64,
    /// Recommended retail price in minor units.
    pub price_rrc: i64,
    pub quantity: i32,
    /// Attribute name to value, e.g. `"Color" -> "Red"`.
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

/// The whole import document.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceList {
    pub categories: Vec<PriceListCategory>,
    pub goods: Vec<PriceListItem>,
}

/// What an import touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories: usize,
    pub offers: usize,
    pub parameters: usize,
}

/// Price-list import service.
pub struct ImportService<'a> {
    shops: ShopRepository<'a>,
    catalog: CatalogRepository<'a>,
}

impl<'a> ImportService<'a> {
    /// Create a new import service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            shops: ShopRepository::new(pool),
            catalog: CatalogRepository::new(pool),
        }
    }

    /// Import a price list into a shop's inventory.
    ///
    /// Categories are matched by name and created on demand, then linked to
    /// the shop. Every good is upserted on (product, shop, `supplier_id`)
    /// with `available = true`; goods absent from the document are left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::ShopNotFound` if the shop doesn't exist.
    /// Returns `ImportError::ShopNotWorking` if the shop isn't accepting imports.
    /// Returns `ImportError::UnknownCategory` or `ImportError::Validation` for
    /// malformed documents; nothing is written in that case.
    pub async fn import(
        &self,
        shop_id: ShopId,
        price_list: &PriceList,
    ) -> Result<ImportSummary, ImportError> {
        let shop = self
            .shops
            .get(shop_id)
            .await?
            .ok_or(ImportError::ShopNotFound)?;
        if !shop.working {
            return Err(ImportError::ShopNotWorking);
        }

        validate_price_list(price_list)?;

        let mut summary = ImportSummary::default();

        // Resolve document-local category ids to database rows.
        let mut category_ids: BTreeMap<i32, CategoryId> = BTreeMap::new();
        for doc_category in &price_list.categories {
            let category = match self.catalog.find_category(&doc_category.name).await? {
                Some(existing) => existing,
                None => self.catalog.create_category(&doc_category.name).await?,
            };
            self.shops.add_category(shop_id, category.id).await?;
            category_ids.insert(doc_category.id, category.id);
            summary.categories += 1;
        }

        for good in &price_list.goods {
            let category_id = *category_ids
                .get(&good.category)
                .ok_or(ImportError::UnknownCategory(good.category))?;

            let product = match self.catalog.find_product(&good.name, category_id).await? {
                Some(existing) => existing,
                None => self.catalog.create_product(&good.name, category_id).await?,
            };

            let facts = OfferFacts {
                quantity: good.quantity,
                price: Price::from_minor(good.price),
                price_rrc: Price::from_minor(good.price_rrc),
                available: true,
            };
            let info = self
                .catalog
                .upsert_product_info(product.id, shop_id, good.id, facts)
                .await?;
            summary.offers += 1;

            for (name, value) in &good.parameters {
                let parameter = self.catalog.get_or_create_parameter(name).await?;
                let value = scalar_to_string(value)
                    .ok_or_else(|| ImportError::Validation(format!(
                        "parameter {name:?} of good {} must be a scalar",
                        good.id
                    )))?;
                self.catalog
                    .set_product_parameter(info.id, parameter.id, &value)
                    .await?;
                summary.parameters += 1;
            }
        }

        tracing::info!(
            shop_id = %shop_id,
            categories = summary.categories,
            offers = summary.offers,
            "imported price list"
        );
        Ok(summary)
    }
}

/// Reject documents that would violate inventory invariants before any row
/// is written.
fn validate_price_list(price_list: &PriceList) -> Result<(), ImportError> {
    for good in &price_list.goods {
        if good.quantity < 0 {
            return Err(ImportError::Validation(format!(
                "good {} has negative quantity",
                good.id
            )));
        }
        if good.price < 0 || good.price_rrc < 0 {
            return Err(ImportError::Validation(format!(
                "good {} has a negative price",
                good.id
            )));
        }
        if good.name.trim().is_empty() {
            return Err(ImportError::Validation(format!(
                "good {} has an empty name",
                good.id
            )));
        }
    }
    for category in &price_list.categories {
        if category.name.trim().is_empty() {
            return Err(ImportError::Validation(format!(
                "category {} has an empty name",
                category.id
            )));
        }
    }
    Ok(())
}

/// Render a JSON scalar as the parameter value string. Arrays and objects
/// have no sensible text form and are rejected.
fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    }
}
