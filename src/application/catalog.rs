use std::sync::Arc;

use bigdecimal::rounding::RoundingMode;
use bigdecimal::BigDecimal;
use diesel::PgConnection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::application::cache_keys;
use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ListCache;
use crate::infrastructure::catalog;
use crate::infrastructure::models::{
    BrandChanges, BrandRow, CustomerChanges, CustomerRow, NewBrandRow, NewCustomerRow, NewProductRow,
    ProductChanges, ProductRow, ProductWithBrandRow,
};

// ── Inputs ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CreateBrand {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

/// `None` leaves a field untouched; `Some(None)` clears a nullable one.
#[derive(Debug, Default)]
pub struct UpdateBrand {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
    pub logo_url: Option<Option<String>>,
}

#[derive(Debug)]
pub struct CreateProduct {
    pub brand_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock_count: i32,
    pub image_url: Option<String>,
}

/// No `stock_count` here: stock moves only through checkout and cancel.
#[derive(Debug, Default)]
pub struct UpdateProduct {
    pub brand_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<BigDecimal>,
    pub image_url: Option<Option<String>>,
}

#[derive(Debug)]
pub struct CreateCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Lowercases, maps whitespace runs to single hyphens and drops everything
/// outside `[a-z0-9-]`; falls back to "brand" when nothing survives.
pub(crate) fn slug_from_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.trim().to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch);
            pending_hyphen = false;
        } else if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        "brand".to_string()
    } else {
        slug
    }
}

/// Trims and converts blank strings to `None`.
fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Same, one level deeper: a provided blank string clears the column.
fn clean_nullable(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(clean)
}

fn required_name(name: &str, message: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation(message));
    }
    Ok(name.to_string())
}

fn optional_name(name: Option<String>, message: &str) -> Result<Option<String>, DomainError> {
    name.map(|n| required_name(&n, message)).transpose()
}

fn valid_price(price: BigDecimal) -> Result<BigDecimal, DomainError> {
    if price < BigDecimal::from(0) {
        return Err(DomainError::validation("Valid price is required"));
    }
    Ok(price.with_scale_round(2, RoundingMode::HalfUp))
}

// ── Service ─────────────────────────────────────────────────────────────────

/// Catalog reads and writes with read-through caching of the list views.
/// Unlike the checkout engine this carries no cross-row invariants, so it
/// talks to the database directly instead of going through a port.
pub struct CatalogService {
    pool: DbPool,
    cache: Arc<dyn ListCache>,
}

impl CatalogService {
    pub fn new(pool: DbPool, cache: Arc<dyn ListCache>) -> Self {
        Self { pool, cache }
    }

    /// Read-through: serve the cached JSON when present and decodable,
    /// otherwise load, cache and return. A stale or corrupt entry is just a
    /// miss.
    fn cached<T, F>(&self, key: &str, load: F) -> Result<T, DomainError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut PgConnection) -> Result<T, DomainError>,
    {
        if let Some(raw) = self.cache.get(key) {
            if let Ok(value) = serde_json::from_str(&raw) {
                return Ok(value);
            }
        }
        let mut conn = self.pool.get()?;
        let value = load(&mut conn)?;
        if let Ok(serialized) = serde_json::to_string(&value) {
            self.cache.set(key, &serialized, cache_keys::TTL_LIST_SECONDS);
        }
        Ok(value)
    }

    // ── Brands ──────────────────────────────────────────────────────────────

    pub fn brands(&self) -> Result<Vec<BrandRow>, DomainError> {
        self.cached(&cache_keys::brand_list(), catalog::list_brands)
    }

    pub fn brand(&self, id: Uuid) -> Result<Option<BrandRow>, DomainError> {
        let mut conn = self.pool.get()?;
        catalog::get_brand(&mut conn, id)
    }

    pub fn create_brand(&self, input: CreateBrand) -> Result<BrandRow, DomainError> {
        let name = required_name(&input.name, "Name is required")?;
        let slug = match clean(input.slug) {
            Some(slug) => slug,
            None => slug_from_name(&name),
        };
        let row = NewBrandRow {
            id: Uuid::new_v4(),
            name,
            slug: Some(slug),
            description: clean(input.description),
            logo_url: clean(input.logo_url),
        };
        let mut conn = self.pool.get()?;
        let created = catalog::insert_brand(&mut conn, row)?;
        self.cache.invalidate_prefix(cache_keys::BRAND_PREFIX);
        Ok(created)
    }

    pub fn update_brand(&self, id: Uuid, update: UpdateBrand) -> Result<BrandRow, DomainError> {
        let name = optional_name(update.name, "Name is required")?;
        // An explicit slug wins; a blank or missing one is re-derived when
        // the name changes and left alone otherwise.
        let slug = match clean(update.slug) {
            Some(slug) => Some(slug),
            None => name.as_deref().map(slug_from_name),
        };
        let changes = BrandChanges {
            name,
            slug,
            description: clean_nullable(update.description),
            logo_url: clean_nullable(update.logo_url),
        };

        let mut conn = self.pool.get()?;
        if changes.is_empty() {
            return catalog::get_brand(&mut conn, id)?.ok_or_else(|| DomainError::not_found("Brand not found"));
        }
        let updated = catalog::update_brand(&mut conn, id, &changes)?
            .ok_or_else(|| DomainError::not_found("Brand not found"))?;
        // Brand names are denormalized into the product list view.
        self.cache.invalidate_prefix(cache_keys::BRAND_PREFIX);
        self.cache.invalidate_prefix(cache_keys::PRODUCT_PREFIX);
        Ok(updated)
    }

    pub fn delete_brand(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        if !catalog::delete_brand(&mut conn, id)? {
            return Err(DomainError::not_found("Brand not found"));
        }
        // The delete cascades to the brand's products.
        self.cache.invalidate_prefix(cache_keys::BRAND_PREFIX);
        self.cache.invalidate_prefix(cache_keys::PRODUCT_PREFIX);
        Ok(())
    }

    // ── Products ────────────────────────────────────────────────────────────

    pub fn products(&self, brand_name: Option<&str>) -> Result<Vec<ProductWithBrandRow>, DomainError> {
        let filter = brand_name.map(str::trim).filter(|s| !s.is_empty());
        let key = match filter {
            Some(name) => cache_keys::product_list_by_brand(name),
            None => cache_keys::product_list(),
        };
        self.cached(&key, |conn| catalog::list_products(conn, filter))
    }

    pub fn product(&self, id: Uuid) -> Result<Option<ProductWithBrandRow>, DomainError> {
        let mut conn = self.pool.get()?;
        catalog::get_product(&mut conn, id)
    }

    pub fn create_product(&self, input: CreateProduct) -> Result<ProductRow, DomainError> {
        let name = required_name(&input.name, "name is required")?;
        let price = valid_price(input.price)?;
        let row = NewProductRow {
            id: Uuid::new_v4(),
            brand_id: input.brand_id,
            name,
            description: clean(input.description),
            price,
            stock_count: input.stock_count.max(0),
            image_url: clean(input.image_url),
        };
        let mut conn = self.pool.get()?;
        let created = catalog::insert_product(&mut conn, row)?;
        self.cache.invalidate_prefix(cache_keys::PRODUCT_PREFIX);
        Ok(created)
    }

    pub fn update_product(&self, id: Uuid, update: UpdateProduct) -> Result<ProductRow, DomainError> {
        let name = optional_name(update.name, "name is required")?;
        let price = update.price.map(valid_price).transpose()?;
        let changes = ProductChanges {
            brand_id: update.brand_id,
            name,
            description: clean_nullable(update.description),
            price,
            image_url: clean_nullable(update.image_url),
        };

        let mut conn = self.pool.get()?;
        if changes.is_empty() {
            return catalog::get_product_row(&mut conn, id)?
                .ok_or_else(|| DomainError::not_found("Product not found"));
        }
        let updated = catalog::update_product(&mut conn, id, &changes)?
            .ok_or_else(|| DomainError::not_found("Product not found"))?;
        self.cache.invalidate_prefix(cache_keys::PRODUCT_PREFIX);
        Ok(updated)
    }

    pub fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        if !catalog::delete_product(&mut conn, id)? {
            return Err(DomainError::not_found("Product not found"));
        }
        self.cache.invalidate_prefix(cache_keys::PRODUCT_PREFIX);
        Ok(())
    }

    // ── Customers ───────────────────────────────────────────────────────────

    pub fn customers(&self) -> Result<Vec<CustomerRow>, DomainError> {
        self.cached(&cache_keys::customer_list(), catalog::list_customers)
    }

    pub fn customer(&self, id: Uuid) -> Result<Option<CustomerRow>, DomainError> {
        let mut conn = self.pool.get()?;
        catalog::get_customer(&mut conn, id)
    }

    pub fn create_customer(&self, input: CreateCustomer) -> Result<CustomerRow, DomainError> {
        let name = required_name(&input.name, "name is required")?;
        let row = NewCustomerRow {
            id: Uuid::new_v4(),
            name,
            phone: clean(input.phone),
            address: clean(input.address),
            image_url: clean(input.image_url),
        };
        let mut conn = self.pool.get()?;
        let created = catalog::insert_customer(&mut conn, row)?;
        self.cache.invalidate_prefix(cache_keys::CUSTOMER_PREFIX);
        Ok(created)
    }

    pub fn update_customer(&self, id: Uuid, update: UpdateCustomer) -> Result<CustomerRow, DomainError> {
        let changes = CustomerChanges {
            name: optional_name(update.name, "name is required")?,
            phone: clean_nullable(update.phone),
            address: clean_nullable(update.address),
            image_url: clean_nullable(update.image_url),
        };

        let mut conn = self.pool.get()?;
        if changes.is_empty() {
            return catalog::get_customer(&mut conn, id)?
                .ok_or_else(|| DomainError::not_found("Customer not found"));
        }
        let updated = catalog::update_customer(&mut conn, id, &changes)?
            .ok_or_else(|| DomainError::not_found("Customer not found"))?;
        self.cache.invalidate_prefix(cache_keys::CUSTOMER_PREFIX);
        Ok(updated)
    }

    pub fn delete_customer(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        if !catalog::delete_customer(&mut conn, id)? {
            return Err(DomainError::not_found("Customer not found"));
        }
        // The delete cascades to the customer's order lines; stock is not
        // restored on that path.
        self.cache.invalidate_prefix(cache_keys::CUSTOMER_PREFIX);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_name_normalizes_spacing_and_symbols() {
        assert_eq!(slug_from_name("Acme Corp"), "acme-corp");
        assert_eq!(slug_from_name("  Très  Chic!  "), "trs-chic");
        assert_eq!(slug_from_name("--Already-Sluggy--"), "already-sluggy");
        assert_eq!(slug_from_name("!!!"), "brand");
    }

    #[test]
    fn clean_maps_blank_strings_to_none() {
        assert_eq!(clean(Some("  hi  ".into())), Some("hi".to_string()));
        assert_eq!(clean(Some("   ".into())), None);
        assert_eq!(clean(None), None);
    }

    #[test]
    fn clean_nullable_keeps_the_clear_signal() {
        assert_eq!(clean_nullable(None), None);
        assert_eq!(clean_nullable(Some(None)), Some(None));
        assert_eq!(clean_nullable(Some(Some("  ".into()))), Some(None));
        assert_eq!(clean_nullable(Some(Some(" x ".into()))), Some(Some("x".to_string())));
    }

    #[test]
    fn valid_price_rejects_negatives_and_rounds_to_cents() {
        use std::str::FromStr;
        assert!(valid_price(BigDecimal::from_str("-0.01").unwrap()).is_err());
        assert_eq!(
            valid_price(BigDecimal::from_str("10.005").unwrap()).unwrap(),
            BigDecimal::from_str("10.01").unwrap()
        );
    }
}
