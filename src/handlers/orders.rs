use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::{
    CreatedOrder, CustomerOrdersGroup, ItemQuantity, OrderInvoice, OrderLine, StockCheck, StockShortage,
};
use crate::errors::AppError;
use crate::AppWorkflow;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    /// Non-positive quantities are dropped; duplicate product ids are merged.
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Decimal as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
    pub total_amount: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub order_id: Uuid,
    pub lines: Vec<OrderLineResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckStockRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockShortageResponse {
    pub product_id: Uuid,
    pub requested: i32,
    pub available: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckStockResponse {
    pub ok: bool,
    pub insufficient: Vec<StockShortageResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CancelOrderResponse {
    pub cancelled: bool,
    pub order_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    /// Grouping selector; "customer" is the only supported value and the
    /// default.
    pub by: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportLineResponse {
    pub order_id: Uuid,
    pub order_date: String,
    pub product_name: String,
    pub quantity: i32,
    pub total_amount: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerOrdersResponse {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub lines: Vec<ReportLineResponse>,
    pub total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceCustomerResponse {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Item keys follow the invoice view consumed by the front office:
/// `price` is the unit price, `total` the line total.
#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceItemResponse {
    #[serde(rename = "productName")]
    pub product_name: String,
    pub quantity: i32,
    pub price: String,
    pub total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderInvoiceResponse {
    pub order_id: Uuid,
    pub customer: InvoiceCustomerResponse,
    pub created_at: String,
    pub items: Vec<InvoiceItemResponse>,
    pub total: String,
}

fn item_quantities(items: &[OrderItemRequest]) -> Vec<ItemQuantity> {
    items
        .iter()
        .map(|i| ItemQuantity { product_id: i.product_id, quantity: i.quantity })
        .collect()
}

fn line_response(line: &OrderLine) -> OrderLineResponse {
    OrderLineResponse {
        id: line.id,
        order_id: line.order_id,
        customer_id: line.customer_id,
        product_id: line.product_id,
        quantity: line.quantity,
        unit_price: line.unit_price.to_string(),
        total_amount: line.total_amount.to_string(),
        created_at: line.created_at.to_rfc3339(),
    }
}

fn created_response(created: &CreatedOrder) -> CreateOrderResponse {
    CreateOrderResponse {
        order_id: created.order_id,
        lines: created.lines.iter().map(line_response).collect(),
    }
}

fn check_response(check: StockCheck) -> CheckStockResponse {
    CheckStockResponse {
        ok: check.ok,
        insufficient: check.insufficient.into_iter().map(shortage_response).collect(),
    }
}

fn shortage_response(shortage: StockShortage) -> StockShortageResponse {
    StockShortageResponse {
        product_id: shortage.product_id,
        requested: shortage.requested,
        available: shortage.available,
    }
}

fn group_response(group: &CustomerOrdersGroup) -> CustomerOrdersResponse {
    CustomerOrdersResponse {
        customer_id: group.customer_id,
        customer_name: group.customer_name.clone(),
        lines: group
            .lines
            .iter()
            .map(|line| ReportLineResponse {
                order_id: line.order_id,
                order_date: line.order_date.to_rfc3339(),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                total_amount: line.total_amount.to_string(),
            })
            .collect(),
        total: group.total.to_string(),
    }
}

fn invoice_response(invoice: &OrderInvoice) -> OrderInvoiceResponse {
    OrderInvoiceResponse {
        order_id: invoice.order_id,
        customer: InvoiceCustomerResponse {
            name: invoice.customer.name.clone(),
            phone: invoice.customer.phone.clone(),
            address: invoice.customer.address.clone(),
        },
        created_at: invoice.created_at.to_rfc3339(),
        items: invoice
            .items
            .iter()
            .map(|item| InvoiceItemResponse {
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                price: item.unit_price.to_string(),
                total: item.total_amount.to_string(),
            })
            .collect(),
        total: invoice.total.to_string(),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places an order. Prices come from the product table at this moment, never
/// from the client. The stock pre-check reports every shortage in one
/// response; the transactional guard inside the store is what actually
/// prevents overselling under concurrency.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Invalid items or insufficient stock"),
        (status = 404, description = "Customer or product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    workflow: web::Data<AppWorkflow>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let created = web::block(move || {
        let items = item_quantities(&body.items);
        workflow.create_order(body.customer_id, &items)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(created_response(&created)))
}

/// POST /orders/check-stock
///
/// Advisory availability check for a cart. Always 200: the answer may be
/// stale by the time the order is placed, so callers treat it as a hint.
#[utoipa::path(
    post,
    path = "/orders/check-stock",
    request_body = CheckStockRequest,
    responses(
        (status = 200, description = "Stock check result", body = CheckStockResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn check_stock(
    workflow: web::Data<AppWorkflow>,
    body: web::Json<CheckStockRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let check = web::block(move || {
        let items = item_quantities(&body.items);
        workflow.check_stock(&items)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(check_response(check)))
}

/// GET /orders?by=customer
///
/// Every order line grouped per customer with running totals, newest lines
/// first within each group.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("by" = Option<String>, Query, description = "Grouping selector, only \"customer\""),
    ),
    responses(
        (status = 200, description = "Orders grouped by customer", body = [CustomerOrdersResponse]),
        (status = 400, description = "Unsupported grouping"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    workflow: web::Data<AppWorkflow>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let by = query.into_inner().by.unwrap_or_else(|| "customer".to_string());
    if by != "customer" {
        return Err(AppError::BadRequest(format!("Unsupported by value: {by}")));
    }

    let groups = web::block(move || workflow.orders_by_customer())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(groups.iter().map(group_response).collect::<Vec<_>>()))
}

/// GET /orders/{order_id}
///
/// Invoice view of one order: customer contact header plus priced items.
#[utoipa::path(
    get,
    path = "/orders/{order_id}",
    params(
        ("order_id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order invoice", body = OrderInvoiceResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    workflow: web::Data<AppWorkflow>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let invoice = web::block(move || workflow.order_invoice(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(invoice_response(&invoice)))
}

/// DELETE /orders/{order_id}
///
/// Cancels an order: restores stock for every line and deletes the lines in
/// one transaction. Cancelling twice reports not-found the second time.
#[utoipa::path(
    delete,
    path = "/orders/{order_id}",
    params(
        ("order_id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order cancelled", body = CancelOrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn cancel_order(
    workflow: web::Data<AppWorkflow>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    web::block(move || workflow.cancel_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CancelOrderResponse { cancelled: true, order_id }))
}
