use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One requested (product, quantity) pair after normalization: positive
/// quantity, at most one entry per product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemQuantity {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A product whose available stock does not cover the requested quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortage {
    pub product_id: Uuid,
    pub requested: i32,
    pub available: i32,
}

/// A normalized item together with its server-resolved price snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_amount: BigDecimal,
}

/// A persisted order line. Orders have no table of their own; the lines
/// sharing an `order_id` are the order.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
}

/// Result of a committed checkout.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order_id: Uuid,
    pub lines: Vec<OrderLine>,
}

/// Outcome of the advisory stock check.
#[derive(Debug, Clone)]
pub struct StockCheck {
    pub ok: bool,
    pub insufficient: Vec<StockShortage>,
}

/// One line of the orders report, joined with customer and product names.
#[derive(Debug, Clone)]
pub struct OrderReportRow {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub order_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub quantity: i32,
    pub total_amount: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderReportLine {
    pub order_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub product_name: String,
    pub quantity: i32,
    pub total_amount: BigDecimal,
}

/// Report rows folded per customer, newest lines first, with a running total.
#[derive(Debug, Clone)]
pub struct CustomerOrdersGroup {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub lines: Vec<OrderReportLine>,
    pub total: BigDecimal,
}

/// Customer contact fields shown on an invoice header.
#[derive(Debug, Clone)]
pub struct CustomerBrief {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InvoiceItem {
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_amount: BigDecimal,
}

/// Invoice-shaped view of a single order.
#[derive(Debug, Clone)]
pub struct OrderInvoice {
    pub order_id: Uuid,
    pub customer: CustomerBrief,
    pub created_at: DateTime<Utc>,
    pub items: Vec<InvoiceItem>,
    pub total: BigDecimal,
}
