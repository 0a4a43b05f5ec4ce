//! Connection-level catalog queries. Pooling, caching and validation live in
//! `application::catalog`; everything here takes a connection and talks SQL.

use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::infrastructure::models::{
    BrandChanges, BrandRow, CustomerChanges, CustomerRow, NewBrandRow, NewCustomerRow, NewProductRow,
    ProductChanges, ProductRow, ProductWithBrandRow,
};
use crate::schema::{brands, customers, products};

fn brand_fk_to_not_found(err: diesel::result::Error, brand_id: Uuid) -> DomainError {
    match err {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            DomainError::not_found(format!("Brand not found: {brand_id}"))
        }
        other => other.into(),
    }
}

// ── Brands ──────────────────────────────────────────────────────────────────

pub(crate) fn list_brands(conn: &mut PgConnection) -> Result<Vec<BrandRow>, DomainError> {
    let rows = brands::table
        .select(BrandRow::as_select())
        .order(brands::name.asc())
        .load(conn)?;
    Ok(rows)
}

pub(crate) fn get_brand(conn: &mut PgConnection, id: Uuid) -> Result<Option<BrandRow>, DomainError> {
    let row = brands::table
        .find(id)
        .select(BrandRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row)
}

pub(crate) fn insert_brand(conn: &mut PgConnection, row: NewBrandRow) -> Result<BrandRow, DomainError> {
    let inserted = diesel::insert_into(brands::table).values(&row).get_result(conn)?;
    Ok(inserted)
}

pub(crate) fn update_brand(
    conn: &mut PgConnection,
    id: Uuid,
    changes: &BrandChanges,
) -> Result<Option<BrandRow>, DomainError> {
    let row = diesel::update(brands::table.find(id))
        .set(changes)
        .get_result(conn)
        .optional()?;
    Ok(row)
}

pub(crate) fn delete_brand(conn: &mut PgConnection, id: Uuid) -> Result<bool, DomainError> {
    let deleted = diesel::delete(brands::table.find(id)).execute(conn)?;
    Ok(deleted > 0)
}

// ── Customers ───────────────────────────────────────────────────────────────

pub(crate) fn list_customers(conn: &mut PgConnection) -> Result<Vec<CustomerRow>, DomainError> {
    let rows = customers::table
        .select(CustomerRow::as_select())
        .order(customers::name.asc())
        .load(conn)?;
    Ok(rows)
}

pub(crate) fn get_customer(conn: &mut PgConnection, id: Uuid) -> Result<Option<CustomerRow>, DomainError> {
    let row = customers::table
        .find(id)
        .select(CustomerRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row)
}

pub(crate) fn insert_customer(conn: &mut PgConnection, row: NewCustomerRow) -> Result<CustomerRow, DomainError> {
    let inserted = diesel::insert_into(customers::table).values(&row).get_result(conn)?;
    Ok(inserted)
}

pub(crate) fn update_customer(
    conn: &mut PgConnection,
    id: Uuid,
    changes: &CustomerChanges,
) -> Result<Option<CustomerRow>, DomainError> {
    let row = diesel::update(customers::table.find(id))
        .set(changes)
        .get_result(conn)
        .optional()?;
    Ok(row)
}

pub(crate) fn delete_customer(conn: &mut PgConnection, id: Uuid) -> Result<bool, DomainError> {
    let deleted = diesel::delete(customers::table.find(id)).execute(conn)?;
    Ok(deleted > 0)
}

// ── Products ────────────────────────────────────────────────────────────────

/// Products joined with their brand name, ordered by brand then product name.
/// `brand_name` filters by case-insensitive substring match on the brand.
pub(crate) fn list_products(
    conn: &mut PgConnection,
    brand_name: Option<&str>,
) -> Result<Vec<ProductWithBrandRow>, DomainError> {
    let query = products::table
        .inner_join(brands::table)
        .select(ProductWithBrandRow::as_select())
        .order((brands::name.asc(), products::name.asc()));

    let rows = match brand_name {
        Some(name) => query
            .filter(brands::name.ilike(format!("%{name}%")))
            .load(conn)?,
        None => query.load(conn)?,
    };
    Ok(rows)
}

pub(crate) fn get_product(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<ProductWithBrandRow>, DomainError> {
    let row = products::table
        .inner_join(brands::table)
        .filter(products::id.eq(id))
        .select(ProductWithBrandRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row)
}

/// Bare product row without the brand join, the shape writes return.
pub(crate) fn get_product_row(conn: &mut PgConnection, id: Uuid) -> Result<Option<ProductRow>, DomainError> {
    let row = products::table
        .find(id)
        .select(ProductRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row)
}

pub(crate) fn insert_product(conn: &mut PgConnection, row: NewProductRow) -> Result<ProductRow, DomainError> {
    let brand_id = row.brand_id;
    diesel::insert_into(products::table)
        .values(&row)
        .get_result(conn)
        .map_err(|e| brand_fk_to_not_found(e, brand_id))
}

pub(crate) fn update_product(
    conn: &mut PgConnection,
    id: Uuid,
    changes: &ProductChanges,
) -> Result<Option<ProductRow>, DomainError> {
    diesel::update(products::table.find(id))
        .set(changes)
        .get_result(conn)
        .optional()
        .map_err(|e| match changes.brand_id {
            Some(brand_id) => brand_fk_to_not_found(e, brand_id),
            None => e.into(),
        })
}

pub(crate) fn delete_product(conn: &mut PgConnection, id: Uuid) -> Result<bool, DomainError> {
    let deleted = diesel::delete(products::table.find(id)).execute(conn)?;
    Ok(deleted > 0)
}
