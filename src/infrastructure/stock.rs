use std::collections::HashMap;

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{ItemQuantity, StockShortage};
use crate::domain::ports::StockLedger;
use crate::schema::products;

/// Guarded decrement: one conditional UPDATE evaluated by Postgres, so two
/// concurrent checkouts can never drive `stock_count` negative. Returns the
/// remaining stock, or `None` when the guard rejected the update (not enough
/// stock, unknown product, or a non-positive quantity).
pub(crate) fn apply_decrement(
    conn: &mut PgConnection,
    product_id: Uuid,
    quantity: i32,
) -> Result<Option<i32>, DomainError> {
    if quantity <= 0 {
        return Ok(None);
    }
    let remaining = diesel::update(
        products::table
            .filter(products::id.eq(product_id))
            .filter(products::stock_count.ge(quantity)),
    )
    .set(products::stock_count.eq(products::stock_count - quantity))
    .returning(products::stock_count)
    .get_result::<i32>(conn)
    .optional()?;
    Ok(remaining)
}

/// Unconditional increment, used when cancelling an order. `None` when the
/// product no longer exists or the quantity is non-positive.
pub(crate) fn apply_restore(
    conn: &mut PgConnection,
    product_id: Uuid,
    quantity: i32,
) -> Result<Option<i32>, DomainError> {
    if quantity <= 0 {
        return Ok(None);
    }
    let remaining = diesel::update(products::table.filter(products::id.eq(product_id)))
        .set(products::stock_count.eq(products::stock_count + quantity))
        .returning(products::stock_count)
        .get_result::<i32>(conn)
        .optional()?;
    Ok(remaining)
}

/// Read side of the stock ledger, backed by the `products` table.
pub struct DieselStockLedger {
    pool: DbPool,
}

impl DieselStockLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl StockLedger for DieselStockLedger {
    fn check_availability(&self, items: &[ItemQuantity]) -> Result<Vec<StockShortage>, DomainError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get()?;
        let ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
        let counts: HashMap<Uuid, i32> = products::table
            .filter(products::id.eq_any(&ids))
            .select((products::id, products::stock_count))
            .load::<(Uuid, i32)>(&mut conn)?
            .into_iter()
            .collect();

        Ok(items
            .iter()
            .filter_map(|item| {
                let available = counts.get(&item.product_id).copied().unwrap_or(0);
                (available < item.quantity).then_some(StockShortage {
                    product_id: item.product_id,
                    requested: item.quantity,
                    available,
                })
            })
            .collect())
    }

    fn unit_price(&self, product_id: Uuid) -> Result<Option<BigDecimal>, DomainError> {
        let mut conn = self.pool.get()?;
        let price = products::table
            .filter(products::id.eq(product_id))
            .select(products::price)
            .first::<BigDecimal>(&mut conn)
            .optional()?;
        Ok(price)
    }
}
