use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::catalog::{CatalogService, CreateProduct, UpdateProduct};
use crate::errors::AppError;
use crate::infrastructure::models::{ProductRow, ProductWithBrandRow};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub brand_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Decimal as a string to avoid floating-point issues, e.g. "149.90"
    pub price: String,
    /// Initial stock on hand. Later changes go through orders, not PATCH.
    #[serde(default)]
    pub stock_count: i32,
    pub image_url: Option<String>,
}

/// All fields optional; a JSON `null` clears a nullable column while an
/// absent field leaves it untouched. `stock_count` is not accepted here;
/// stock moves through checkout and cancellation only.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub brand_id: Option<Uuid>,
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    pub price: Option<String>,
    #[serde(default)]
    pub image_url: Option<Option<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub stock_count: i32,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithBrandResponse {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub stock_count: i32,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub brand_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductListParams {
    /// Case-insensitive substring filter on the brand name.
    pub brand_name: Option<String>,
}

fn product_response(row: &ProductRow) -> ProductResponse {
    ProductResponse {
        id: row.id,
        brand_id: row.brand_id,
        name: row.name.clone(),
        description: row.description.clone(),
        price: row.price.to_string(),
        stock_count: row.stock_count,
        image_url: row.image_url.clone(),
        created_at: row.created_at.to_rfc3339(),
        updated_at: row.updated_at.to_rfc3339(),
    }
}

fn product_with_brand_response(row: &ProductWithBrandRow) -> ProductWithBrandResponse {
    ProductWithBrandResponse {
        id: row.id,
        brand_id: row.brand_id,
        name: row.name.clone(),
        description: row.description.clone(),
        price: row.price.to_string(),
        stock_count: row.stock_count,
        image_url: row.image_url.clone(),
        created_at: row.created_at.to_rfc3339(),
        updated_at: row.updated_at.to_rfc3339(),
        brand_name: row.brand_name.clone(),
    }
}

fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim()).map_err(|_| AppError::BadRequest("Valid price is required".to_string()))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products?brand_name=...
///
/// Product list joined with brand names, optionally filtered by brand.
/// Served from the list cache when warm.
#[utoipa::path(
    get,
    path = "/products",
    params(
        ("brand_name" = Option<String>, Query, description = "Substring filter on brand name"),
    ),
    responses(
        (status = 200, description = "Products", body = [ProductWithBrandResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_products(
    catalog: web::Data<CatalogService>,
    query: web::Query<ProductListParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();

    let rows = web::block(move || catalog.products(params.brand_name.as_deref()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(rows.iter().map(product_with_brand_response).collect::<Vec<_>>()))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product", body = ProductWithBrandResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn get_product(
    catalog: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let row = web::block(move || catalog.product(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match row {
        Some(row) => Ok(HttpResponse::Ok().json(product_with_brand_response(&row))),
        None => Err(AppError::NotFound("Product not found".to_string())),
    }
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid name or price"),
        (status = 404, description = "Brand not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn create_product(
    catalog: web::Data<CatalogService>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let price = parse_price(&body.price)?;

    let created = web::block(move || {
        catalog.create_product(CreateProduct {
            brand_id: body.brand_id,
            name: body.name,
            description: body.description,
            price,
            stock_count: body.stock_count,
            image_url: body.image_url,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(product_response(&created)))
}

/// PATCH /products/{id}
///
/// Catalog fields only. Stock cannot be edited here; it moves through
/// checkout and cancellation.
#[utoipa::path(
    patch,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid name or price"),
        (status = 404, description = "Product or brand not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn update_product(
    catalog: web::Data<CatalogService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let price = body.price.as_deref().map(parse_price).transpose()?;

    let updated = web::block(move || {
        catalog.update_product(
            id,
            UpdateProduct {
                brand_id: body.brand_id,
                name: body.name,
                description: body.description,
                price,
                image_url: body.image_url,
            },
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(product_response(&updated)))
}

/// DELETE /products/{id}
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn delete_product(
    catalog: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || catalog.delete_product(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}
