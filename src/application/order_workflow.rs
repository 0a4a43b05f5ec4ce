use std::collections::HashMap;
use std::sync::Arc;

use bigdecimal::rounding::RoundingMode;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::application::cache_keys;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    CreatedOrder, CustomerOrdersGroup, InvoiceItem, ItemQuantity, OrderInvoice, OrderLine, OrderReportLine,
    OrderReportRow, PricedItem, StockCheck,
};
use crate::domain::ports::{ListCache, OrderStore, StockLedger};

/// Drops non-positive quantities and coalesces duplicate product ids into a
/// single entry, keeping first-occurrence order. Everything downstream works
/// on the coalesced list, so the stock check and the guarded decrement both
/// see each product's combined quantity.
pub(crate) fn normalize_items(items: &[ItemQuantity]) -> Vec<ItemQuantity> {
    let mut normalized: Vec<ItemQuantity> = Vec::new();
    for item in items {
        if item.quantity <= 0 {
            continue;
        }
        match normalized.iter_mut().find(|n| n.product_id == item.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => normalized.push(*item),
        }
    }
    normalized
}

/// unit_price * quantity, rounded half-up to two decimal places.
pub(crate) fn line_total(unit_price: &BigDecimal, quantity: i32) -> BigDecimal {
    (unit_price * BigDecimal::from(quantity)).with_scale_round(2, RoundingMode::HalfUp)
}

/// The checkout engine. Orchestrates normalization, the advisory stock
/// check, price resolution and the transactional create/cancel, and keeps
/// the product list cache coherent after stock movements.
pub struct OrderWorkflow<S: OrderStore, L: StockLedger> {
    store: S,
    ledger: L,
    cache: Arc<dyn ListCache>,
}

impl<S: OrderStore, L: StockLedger> OrderWorkflow<S, L> {
    pub fn new(store: S, ledger: L, cache: Arc<dyn ListCache>) -> Self {
        Self { store, ledger, cache }
    }

    /// Places an order: one line per distinct product, prices resolved
    /// server-side at this moment, stock decremented under the transactional
    /// guard. The advisory pre-check reports every shortage at once; the
    /// guard inside [`OrderStore::create`] remains the only thing that
    /// actually prevents overselling.
    pub fn create_order(&self, customer_id: Uuid, items: &[ItemQuantity]) -> Result<CreatedOrder, DomainError> {
        if items.is_empty() {
            return Err(DomainError::validation(
                "items array with at least one { product_id, quantity } is required",
            ));
        }
        let normalized = normalize_items(items);
        if normalized.is_empty() {
            return Err(DomainError::validation(
                "At least one item must have product_id and quantity > 0",
            ));
        }

        let insufficient = self.ledger.check_availability(&normalized)?;
        if !insufficient.is_empty() {
            return Err(DomainError::InsufficientStock(insufficient));
        }

        let mut priced = Vec::with_capacity(normalized.len());
        for item in &normalized {
            let unit_price = self
                .ledger
                .unit_price(item.product_id)?
                .ok_or_else(|| DomainError::not_found(format!("Product not found: {}", item.product_id)))?;
            let total_amount = line_total(&unit_price, item.quantity);
            priced.push(PricedItem {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price,
                total_amount,
            });
        }

        let created = self.store.create(customer_id, &priced)?;

        // Stock moved, so cached product lists are stale. Runs after commit;
        // failures stay inside the cache impl.
        self.cache.invalidate_prefix(cache_keys::PRODUCT_PREFIX);

        Ok(created)
    }

    /// Cancels an order: restores stock for every line and deletes the lines
    /// in one transaction. Returns the number of deleted lines.
    pub fn cancel_order(&self, order_id: Uuid) -> Result<usize, DomainError> {
        let deleted = self.store.cancel(order_id)?;
        self.cache.invalidate_prefix(cache_keys::PRODUCT_PREFIX);
        Ok(deleted)
    }

    /// Advisory stock check. A request that normalizes to nothing is
    /// trivially satisfiable and reports `ok: true`.
    pub fn check_stock(&self, items: &[ItemQuantity]) -> Result<StockCheck, DomainError> {
        let normalized = normalize_items(items);
        if normalized.is_empty() {
            return Ok(StockCheck { ok: true, insufficient: Vec::new() });
        }
        let insufficient = self.ledger.check_availability(&normalized)?;
        Ok(StockCheck { ok: insufficient.is_empty(), insufficient })
    }

    /// Every order line grouped per customer, with per-customer totals.
    pub fn orders_by_customer(&self) -> Result<Vec<CustomerOrdersGroup>, DomainError> {
        let rows = self.store.order_report_rows()?;
        Ok(group_report_rows(rows))
    }

    /// Invoice view of one order: customer contact header plus one item per
    /// line, with product names resolved best-effort (a product deleted since
    /// checkout shows a placeholder name).
    pub fn order_invoice(&self, order_id: Uuid) -> Result<OrderInvoice, DomainError> {
        let lines = self.store.lines_by_order(order_id)?;
        let Some(first) = lines.first() else {
            return Err(DomainError::not_found("Order not found"));
        };
        let customer = self
            .store
            .customer_brief(first.customer_id)?
            .ok_or_else(|| DomainError::not_found(format!("Customer not found: {}", first.customer_id)))?;

        let product_ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
        let names = self.store.product_names(&product_ids)?;
        let (items, total) = invoice_items(&lines, &names);

        Ok(OrderInvoice {
            order_id,
            customer,
            created_at: first.created_at,
            items,
            total,
        })
    }
}

/// Folds report rows into per-customer groups. Rows arrive ordered by
/// customer name then date; grouping is by id so namesakes stay separate.
pub(crate) fn group_report_rows(rows: Vec<OrderReportRow>) -> Vec<CustomerOrdersGroup> {
    let mut groups: Vec<CustomerOrdersGroup> = Vec::new();
    for row in rows {
        let idx = match groups.iter().position(|g| g.customer_id == row.customer_id) {
            Some(idx) => idx,
            None => {
                groups.push(CustomerOrdersGroup {
                    customer_id: row.customer_id,
                    customer_name: row.customer_name.clone(),
                    lines: Vec::new(),
                    total: BigDecimal::from(0),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[idx];
        group.total = &group.total + &row.total_amount;
        group.lines.push(OrderReportLine {
            order_id: row.order_id,
            order_date: row.created_at,
            product_name: row.product_name,
            quantity: row.quantity,
            total_amount: row.total_amount,
        });
    }
    groups
}

pub(crate) fn invoice_items(lines: &[OrderLine], names: &HashMap<Uuid, String>) -> (Vec<InvoiceItem>, BigDecimal) {
    let mut total = BigDecimal::from(0);
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        total = &total + &line.total_amount;
        items.push(InvoiceItem {
            product_name: names
                .get(&line.product_id)
                .cloned()
                .unwrap_or_else(|| "(deleted product)".to_string()),
            quantity: line.quantity,
            unit_price: line.unit_price.clone(),
            total_amount: line.total_amount.clone(),
        });
    }
    (items, total)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::domain::order::{CustomerBrief, StockShortage};

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn item(product_id: Uuid, quantity: i32) -> ItemQuantity {
        ItemQuantity { product_id, quantity }
    }

    #[derive(Default)]
    struct FakeLedgerState {
        stock: HashMap<Uuid, i32>,
        prices: HashMap<Uuid, BigDecimal>,
        checks: Mutex<Vec<Vec<ItemQuantity>>>,
    }

    #[derive(Clone, Default)]
    struct FakeLedger(Arc<FakeLedgerState>);

    impl StockLedger for FakeLedger {
        fn check_availability(&self, items: &[ItemQuantity]) -> Result<Vec<StockShortage>, DomainError> {
            self.0.checks.lock().unwrap().push(items.to_vec());
            Ok(items
                .iter()
                .filter_map(|item| {
                    let available = self.0.stock.get(&item.product_id).copied().unwrap_or(0);
                    (available < item.quantity).then_some(StockShortage {
                        product_id: item.product_id,
                        requested: item.quantity,
                        available,
                    })
                })
                .collect())
        }

        fn unit_price(&self, product_id: Uuid) -> Result<Option<BigDecimal>, DomainError> {
            Ok(self.0.prices.get(&product_id).cloned())
        }
    }

    #[derive(Default)]
    struct FakeStoreState {
        created: Mutex<Vec<(Uuid, Vec<PricedItem>)>>,
        cancelled: Mutex<Vec<Uuid>>,
        lines: Mutex<Vec<OrderLine>>,
        customers: HashMap<Uuid, CustomerBrief>,
        names: HashMap<Uuid, String>,
        report_rows: Vec<OrderReportRow>,
        conflict_on: Option<Uuid>,
    }

    #[derive(Clone, Default)]
    struct FakeStore(Arc<FakeStoreState>);

    impl OrderStore for FakeStore {
        fn create(&self, customer_id: Uuid, items: &[PricedItem]) -> Result<CreatedOrder, DomainError> {
            if let Some(product_id) = self.0.conflict_on {
                if let Some(hit) = items.iter().find(|i| i.product_id == product_id) {
                    return Err(DomainError::StockConflict { product_id, requested: hit.quantity });
                }
            }
            self.0.created.lock().unwrap().push((customer_id, items.to_vec()));
            let order_id = Uuid::new_v4();
            let lines = items
                .iter()
                .map(|i| OrderLine {
                    id: Uuid::new_v4(),
                    order_id,
                    customer_id,
                    product_id: i.product_id,
                    quantity: i.quantity,
                    unit_price: i.unit_price.clone(),
                    total_amount: i.total_amount.clone(),
                    created_at: Utc::now(),
                })
                .collect();
            Ok(CreatedOrder { order_id, lines })
        }

        fn cancel(&self, order_id: Uuid) -> Result<usize, DomainError> {
            self.0.cancelled.lock().unwrap().push(order_id);
            let mut lines = self.0.lines.lock().unwrap();
            let before = lines.len();
            lines.retain(|l| l.order_id != order_id);
            let deleted = before - lines.len();
            if deleted == 0 {
                return Err(DomainError::not_found("Order not found"));
            }
            Ok(deleted)
        }

        fn lines_by_order(&self, order_id: Uuid) -> Result<Vec<OrderLine>, DomainError> {
            Ok(self
                .0
                .lines
                .lock()
                .unwrap()
                .iter()
                .filter(|l| l.order_id == order_id)
                .cloned()
                .collect())
        }

        fn order_report_rows(&self) -> Result<Vec<OrderReportRow>, DomainError> {
            Ok(self.0.report_rows.clone())
        }

        fn customer_brief(&self, customer_id: Uuid) -> Result<Option<CustomerBrief>, DomainError> {
            Ok(self.0.customers.get(&customer_id).cloned())
        }

        fn product_names(&self, product_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DomainError> {
            Ok(product_ids
                .iter()
                .filter_map(|id| self.0.names.get(id).map(|n| (*id, n.clone())))
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingCacheState {
        invalidated: Mutex<Vec<String>>,
        gets: Mutex<Vec<String>>,
    }

    #[derive(Clone, Default)]
    struct RecordingCache(Arc<RecordingCacheState>);

    impl ListCache for RecordingCache {
        fn get(&self, key: &str) -> Option<String> {
            self.0.gets.lock().unwrap().push(key.to_string());
            None
        }

        fn set(&self, _key: &str, _value: &str, _ttl_seconds: u64) {}

        fn invalidate_prefix(&self, prefix: &str) {
            self.0.invalidated.lock().unwrap().push(prefix.to_string());
        }
    }

    fn workflow(
        store: FakeStore,
        ledger: FakeLedger,
        cache: RecordingCache,
    ) -> OrderWorkflow<FakeStore, FakeLedger> {
        OrderWorkflow::new(store, ledger, Arc::new(cache))
    }

    fn ledger_with(products: &[(Uuid, i32, &str)]) -> FakeLedger {
        let mut state = FakeLedgerState::default();
        for (id, stock, price) in products {
            state.stock.insert(*id, *stock);
            state.prices.insert(*id, dec(price));
        }
        FakeLedger(Arc::new(state))
    }

    // ── normalize_items ──────────────────────────────────────────────────────

    #[test]
    fn normalize_drops_non_positive_quantities() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let normalized = normalize_items(&[item(a, 0), item(b, 2), item(a, -3)]);
        assert_eq!(normalized, vec![item(b, 2)]);
    }

    #[test]
    fn normalize_coalesces_duplicates_keeping_first_position() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let normalized = normalize_items(&[item(a, 2), item(b, 1), item(a, 3)]);
        assert_eq!(normalized, vec![item(a, 5), item(b, 1)]);
    }

    // ── line_total ───────────────────────────────────────────────────────────

    #[test]
    fn line_total_rounds_half_up_to_cents() {
        assert_eq!(line_total(&dec("19.99"), 3), dec("59.97"));
        assert_eq!(line_total(&dec("0.335"), 1), dec("0.34"));
        assert_eq!(line_total(&dec("10"), 2), dec("20.00"));
    }

    // ── create_order ─────────────────────────────────────────────────────────

    #[test]
    fn create_order_prices_lines_and_invalidates_product_cache() {
        let product = Uuid::new_v4();
        let customer = Uuid::new_v4();
        let store = FakeStore::default();
        let ledger = ledger_with(&[(product, 10, "19.99")]);
        let cache = RecordingCache::default();
        let wf = workflow(store.clone(), ledger, cache.clone());

        let created = wf.create_order(customer, &[item(product, 3)]).expect("order");

        assert_eq!(created.lines.len(), 1);
        assert_eq!(created.lines[0].unit_price, dec("19.99"));
        assert_eq!(created.lines[0].total_amount, dec("59.97"));
        let recorded = store.0.created.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, customer);
        assert_eq!(
            cache.0.invalidated.lock().unwrap().as_slice(),
            &[cache_keys::PRODUCT_PREFIX.to_string()]
        );
    }

    #[test]
    fn create_order_coalesces_before_checking_stock() {
        let product = Uuid::new_v4();
        let customer = Uuid::new_v4();
        let store = FakeStore::default();
        // 5 on hand; 3 + 3 fits per item but not combined.
        let ledger = ledger_with(&[(product, 5, "1.00")]);
        let cache = RecordingCache::default();
        let wf = workflow(store.clone(), ledger.clone(), cache);

        let result = wf.create_order(customer, &[item(product, 3), item(product, 3)]);

        let Err(DomainError::InsufficientStock(shortages)) = result else {
            panic!("expected InsufficientStock, got {result:?}");
        };
        assert_eq!(
            shortages,
            vec![StockShortage { product_id: product, requested: 6, available: 5 }]
        );
        // The ledger saw one coalesced entry, not two.
        let checks = ledger.0.checks.lock().unwrap();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0], vec![item(product, 6)]);
        assert!(store.0.created.lock().unwrap().is_empty());
    }

    #[test]
    fn create_order_reports_every_shortage_at_once() {
        let scarce_a = Uuid::new_v4();
        let scarce_b = Uuid::new_v4();
        let plenty = Uuid::new_v4();
        let ledger = ledger_with(&[(scarce_a, 1, "1.00"), (scarce_b, 0, "1.00"), (plenty, 10, "1.00")]);
        let wf = workflow(FakeStore::default(), ledger, RecordingCache::default());

        let result = wf.create_order(
            Uuid::new_v4(),
            &[item(scarce_a, 2), item(plenty, 1), item(scarce_b, 1)],
        );

        let Err(DomainError::InsufficientStock(shortages)) = result else {
            panic!("expected InsufficientStock, got {result:?}");
        };
        assert_eq!(shortages.len(), 2);
        assert!(shortages.contains(&StockShortage { product_id: scarce_a, requested: 2, available: 1 }));
        assert!(shortages.contains(&StockShortage { product_id: scarce_b, requested: 1, available: 0 }));
    }

    #[test]
    fn create_order_rejects_empty_and_all_invalid_item_lists() {
        let wf = workflow(FakeStore::default(), FakeLedger::default(), RecordingCache::default());

        assert!(matches!(
            wf.create_order(Uuid::new_v4(), &[]),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            wf.create_order(Uuid::new_v4(), &[item(Uuid::new_v4(), 0)]),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn create_order_surfaces_recheck_conflict_without_cache_invalidation() {
        let product = Uuid::new_v4();
        let mut store_state = FakeStoreState::default();
        store_state.conflict_on = Some(product);
        let store = FakeStore(Arc::new(store_state));
        let ledger = ledger_with(&[(product, 5, "2.00")]);
        let cache = RecordingCache::default();
        let wf = workflow(store, ledger, cache.clone());

        let result = wf.create_order(Uuid::new_v4(), &[item(product, 5)]);

        assert!(matches!(result, Err(DomainError::StockConflict { requested: 5, .. })));
        assert!(cache.0.invalidated.lock().unwrap().is_empty());
    }

    #[test]
    fn create_order_fails_when_product_has_no_price_row() {
        let product = Uuid::new_v4();
        // Stocked but absent from the price map: the pre-check passes, the
        // price lookup does not.
        let mut state = FakeLedgerState::default();
        state.stock.insert(product, 10);
        let ledger = FakeLedger(Arc::new(state));
        let wf = workflow(FakeStore::default(), ledger, RecordingCache::default());

        let result = wf.create_order(Uuid::new_v4(), &[item(product, 1)]);

        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    // ── cancel_order ─────────────────────────────────────────────────────────

    #[test]
    fn cancel_order_invalidates_product_cache_on_success_only() {
        let customer = Uuid::new_v4();
        let product = Uuid::new_v4();
        let order_id = Uuid::new_v4();
        let mut state = FakeStoreState::default();
        state.lines = Mutex::new(vec![OrderLine {
            id: Uuid::new_v4(),
            order_id,
            customer_id: customer,
            product_id: product,
            quantity: 2,
            unit_price: dec("3.00"),
            total_amount: dec("6.00"),
            created_at: Utc::now(),
        }]);
        let store = FakeStore(Arc::new(state));
        let cache = RecordingCache::default();
        let wf = workflow(store, FakeLedger::default(), cache.clone());

        assert_eq!(wf.cancel_order(order_id).expect("cancel"), 1);
        assert_eq!(cache.0.invalidated.lock().unwrap().len(), 1);

        assert!(matches!(wf.cancel_order(order_id), Err(DomainError::NotFound(_))));
        assert_eq!(cache.0.invalidated.lock().unwrap().len(), 1);
    }

    // ── check_stock ──────────────────────────────────────────────────────────

    #[test]
    fn check_stock_is_ok_for_empty_or_degenerate_requests() {
        let wf = workflow(FakeStore::default(), FakeLedger::default(), RecordingCache::default());

        let check = wf.check_stock(&[]).expect("check");
        assert!(check.ok);
        assert!(check.insufficient.is_empty());

        let check = wf.check_stock(&[item(Uuid::new_v4(), 0)]).expect("check");
        assert!(check.ok);
    }

    #[test]
    fn stock_decisions_never_consult_the_cache() {
        let product = Uuid::new_v4();
        let ledger = ledger_with(&[(product, 1, "1.00")]);
        let cache = RecordingCache::default();
        let wf = workflow(FakeStore::default(), ledger, cache.clone());

        // However stale the cached product lists are, availability answers
        // come from the ledger alone.
        let result = wf.create_order(Uuid::new_v4(), &[item(product, 2)]);
        assert!(matches!(result, Err(DomainError::InsufficientStock(_))));

        let check = wf.check_stock(&[item(product, 2)]).expect("check");
        assert!(!check.ok);

        assert!(cache.0.gets.lock().unwrap().is_empty());
    }

    #[test]
    fn check_stock_reports_unknown_products_as_zero_available() {
        let unknown = Uuid::new_v4();
        let wf = workflow(FakeStore::default(), FakeLedger::default(), RecordingCache::default());

        let check = wf.check_stock(&[item(unknown, 2)]).expect("check");

        assert!(!check.ok);
        assert_eq!(
            check.insufficient,
            vec![StockShortage { product_id: unknown, requested: 2, available: 0 }]
        );
    }

    // ── grouping and invoices ────────────────────────────────────────────────

    #[test]
    fn group_report_rows_folds_per_customer_with_totals() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let order_a = Uuid::new_v4();
        let order_b = Uuid::new_v4();
        let now = Utc::now();
        let row = |customer_id, name: &str, order_id, product: &str, total: &str| OrderReportRow {
            customer_id,
            customer_name: name.to_string(),
            order_id,
            created_at: now,
            product_name: product.to_string(),
            quantity: 1,
            total_amount: dec(total),
        };

        let groups = group_report_rows(vec![
            row(alice, "Alice", order_a, "Widget", "10.00"),
            row(alice, "Alice", order_a, "Gadget", "5.50"),
            row(bob, "Bob", order_b, "Widget", "10.00"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].customer_name, "Alice");
        assert_eq!(groups[0].lines.len(), 2);
        assert_eq!(groups[0].total, dec("15.50"));
        assert_eq!(groups[1].customer_name, "Bob");
        assert_eq!(groups[1].total, dec("10.00"));
    }

    #[test]
    fn order_invoice_resolves_names_and_sums_totals() {
        let customer = Uuid::new_v4();
        let known = Uuid::new_v4();
        let vanished = Uuid::new_v4();
        let order_id = Uuid::new_v4();
        let now = Utc::now();
        let line = |product_id, unit: &str, total: &str| OrderLine {
            id: Uuid::new_v4(),
            order_id,
            customer_id: customer,
            product_id,
            quantity: 1,
            unit_price: dec(unit),
            total_amount: dec(total),
            created_at: now,
        };
        let mut state = FakeStoreState::default();
        state.lines = Mutex::new(vec![line(known, "10.00", "10.00"), line(vanished, "4.00", "4.00")]);
        state.customers.insert(
            customer,
            CustomerBrief { id: customer, name: "Alice".into(), phone: Some("555".into()), address: None },
        );
        state.names.insert(known, "Widget".into());
        let store = FakeStore(Arc::new(state));
        let wf = workflow(store, FakeLedger::default(), RecordingCache::default());

        let invoice = wf.order_invoice(order_id).expect("invoice");

        assert_eq!(invoice.customer.name, "Alice");
        assert_eq!(invoice.items.len(), 2);
        assert_eq!(invoice.items[0].product_name, "Widget");
        assert_eq!(invoice.items[1].product_name, "(deleted product)");
        assert_eq!(invoice.total, dec("14.00"));
    }

    #[test]
    fn order_invoice_for_unknown_order_is_not_found() {
        let wf = workflow(FakeStore::default(), FakeLedger::default(), RecordingCache::default());
        assert!(matches!(wf.order_invoice(Uuid::new_v4()), Err(DomainError::NotFound(_))));
    }
}
