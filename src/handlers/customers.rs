use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::catalog::{CatalogService, CreateCustomer, UpdateCustomer};
use crate::errors::AppError;
use crate::infrastructure::models::CustomerRow;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<Option<String>>,
    #[serde(default)]
    pub address: Option<Option<String>>,
    #[serde(default)]
    pub image_url: Option<Option<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

fn customer_response(row: &CustomerRow) -> CustomerResponse {
    CustomerResponse {
        id: row.id,
        name: row.name.clone(),
        phone: row.phone.clone(),
        address: row.address.clone(),
        image_url: row.image_url.clone(),
        created_at: row.created_at.to_rfc3339(),
        updated_at: row.updated_at.to_rfc3339(),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /customers
#[utoipa::path(
    get,
    path = "/customers",
    responses(
        (status = 200, description = "Customers ordered by name", body = [CustomerResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_customers(catalog: web::Data<CatalogService>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || catalog.customers())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(rows.iter().map(customer_response).collect::<Vec<_>>()))
}

/// GET /customers/{id}
#[utoipa::path(
    get,
    path = "/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer UUID"),
    ),
    responses(
        (status = 200, description = "Customer", body = CustomerResponse),
        (status = 404, description = "Customer not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn get_customer(
    catalog: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let row = web::block(move || catalog.customer(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match row {
        Some(row) => Ok(HttpResponse::Ok().json(customer_response(&row))),
        None => Err(AppError::NotFound("Customer not found".to_string())),
    }
}

/// POST /customers
#[utoipa::path(
    post,
    path = "/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 400, description = "Missing name"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn create_customer(
    catalog: web::Data<CatalogService>,
    body: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let created = web::block(move || {
        catalog.create_customer(CreateCustomer {
            name: body.name,
            phone: body.phone,
            address: body.address,
            image_url: body.image_url,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(customer_response(&created)))
}

/// PATCH /customers/{id}
#[utoipa::path(
    patch,
    path = "/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer UUID"),
    ),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 400, description = "Invalid name"),
        (status = 404, description = "Customer not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn update_customer(
    catalog: web::Data<CatalogService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();

    let updated = web::block(move || {
        catalog.update_customer(
            id,
            UpdateCustomer {
                name: body.name,
                phone: body.phone,
                address: body.address,
                image_url: body.image_url,
            },
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(customer_response(&updated)))
}

/// DELETE /customers/{id}
///
/// Cascades to the customer's order lines. Stock is not restored on this
/// path; cancel individual orders first when that matters.
#[utoipa::path(
    delete,
    path = "/customers/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer UUID"),
    ),
    responses(
        (status = 200, description = "Customer deleted"),
        (status = 404, description = "Customer not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn delete_customer(
    catalog: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || catalog.delete_customer(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}
