use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::catalog::{CatalogService, CreateBrand, UpdateBrand};
use crate::errors::AppError;
use crate::infrastructure::models::BrandRow;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBrandRequest {
    pub name: String,
    /// Derived from the name when absent or blank.
    pub slug: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBrandRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub logo_url: Option<Option<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BrandResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

fn brand_response(row: &BrandRow) -> BrandResponse {
    BrandResponse {
        id: row.id,
        name: row.name.clone(),
        slug: row.slug.clone(),
        description: row.description.clone(),
        logo_url: row.logo_url.clone(),
        created_at: row.created_at.to_rfc3339(),
        updated_at: row.updated_at.to_rfc3339(),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /brands
#[utoipa::path(
    get,
    path = "/brands",
    responses(
        (status = 200, description = "Brands ordered by name", body = [BrandResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_brands(catalog: web::Data<CatalogService>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || catalog.brands())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(rows.iter().map(brand_response).collect::<Vec<_>>()))
}

/// GET /brands/{id}
#[utoipa::path(
    get,
    path = "/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand UUID"),
    ),
    responses(
        (status = 200, description = "Brand", body = BrandResponse),
        (status = 404, description = "Brand not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn get_brand(
    catalog: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let row = web::block(move || catalog.brand(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match row {
        Some(row) => Ok(HttpResponse::Ok().json(brand_response(&row))),
        None => Err(AppError::NotFound("Brand not found".to_string())),
    }
}

/// POST /brands
#[utoipa::path(
    post,
    path = "/brands",
    request_body = CreateBrandRequest,
    responses(
        (status = 201, description = "Brand created", body = BrandResponse),
        (status = 400, description = "Missing name"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn create_brand(
    catalog: web::Data<CatalogService>,
    body: web::Json<CreateBrandRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let created = web::block(move || {
        catalog.create_brand(CreateBrand {
            name: body.name,
            slug: body.slug,
            description: body.description,
            logo_url: body.logo_url,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(brand_response(&created)))
}

/// PATCH /brands/{id}
///
/// Renaming a brand also refreshes cached product lists, which denormalize
/// the brand name.
#[utoipa::path(
    patch,
    path = "/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand UUID"),
    ),
    request_body = UpdateBrandRequest,
    responses(
        (status = 200, description = "Brand updated", body = BrandResponse),
        (status = 400, description = "Invalid name"),
        (status = 404, description = "Brand not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn update_brand(
    catalog: web::Data<CatalogService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateBrandRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();

    let updated = web::block(move || {
        catalog.update_brand(
            id,
            UpdateBrand {
                name: body.name,
                slug: body.slug,
                description: body.description,
                logo_url: body.logo_url,
            },
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(brand_response(&updated)))
}

/// DELETE /brands/{id}
///
/// Cascades to the brand's products.
#[utoipa::path(
    delete,
    path = "/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand UUID"),
    ),
    responses(
        (status = 200, description = "Brand deleted"),
        (status = 404, description = "Brand not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn delete_brand(
    catalog: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || catalog.delete_brand(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}
