use std::collections::HashMap;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{CreatedOrder, CustomerBrief, ItemQuantity, OrderLine, OrderReportRow, PricedItem, StockShortage};

/// Authoritative per-product availability and pricing reads.
///
/// Stock writes never go through this trait: the guarded decrement and the
/// restoring increment run inside the transactions owned by [`OrderStore`],
/// so order rows and stock always move together.
pub trait StockLedger: Send + Sync + 'static {
    /// Items whose requested quantity exceeds current stock. Advisory only:
    /// the answer can be stale by the time the checkout transaction runs, and
    /// the transactional guard remains the authority. Unknown products report
    /// `available = 0`.
    fn check_availability(&self, items: &[ItemQuantity]) -> Result<Vec<StockShortage>, DomainError>;

    /// Current price of a product, read once at order time. `None` when the
    /// product does not exist.
    fn unit_price(&self, product_id: Uuid) -> Result<Option<BigDecimal>, DomainError>;
}

/// Durable storage of order lines, including the two transactional
/// composites of the checkout engine.
pub trait OrderStore: Send + Sync + 'static {
    /// Insert one line per priced item under a fresh order id and apply the
    /// guarded stock decrement for each, all in one transaction. Rolls
    /// everything back on the first failed guard
    /// ([`DomainError::StockConflict`]) or on an unknown customer.
    fn create(&self, customer_id: Uuid, items: &[PricedItem]) -> Result<CreatedOrder, DomainError>;

    /// Restore stock for every line of the order, then delete the lines, in
    /// one transaction. Returns the number of deleted lines; `NotFound` when
    /// the order has none.
    fn cancel(&self, order_id: Uuid) -> Result<usize, DomainError>;

    /// All lines sharing the order id. Empty means the order does not exist.
    fn lines_by_order(&self, order_id: Uuid) -> Result<Vec<OrderLine>, DomainError>;

    /// Every line joined with customer and product names, ordered by customer
    /// name and then newest first. Input for the grouped-by-customer report.
    fn order_report_rows(&self) -> Result<Vec<OrderReportRow>, DomainError>;

    /// Contact fields for an invoice header.
    fn customer_brief(&self, customer_id: Uuid) -> Result<Option<CustomerBrief>, DomainError>;

    /// Display names for the given products. Ids of products deleted since
    /// the order was placed are simply absent from the map.
    fn product_names(&self, product_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DomainError>;
}

/// Best-effort cache for list views. Implementations must swallow every
/// backend failure: a failed `get` is a miss, a failed `set` or
/// `invalidate_prefix` is a no-op. Callers never see cache errors and never
/// treat a hit as authoritative.
pub trait ListCache: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str, ttl_seconds: u64);

    /// Drop every key starting with `prefix`.
    fn invalidate_prefix(&self, prefix: &str);
}
