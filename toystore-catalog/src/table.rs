//! The product table: a reader/writer-locked map from product name to
//! `(price, quantity)`, plus the dirty flag the durable writer watches.
//!
//! Grounded on the concurrency shape of the workspace template's order book
//! (`orderbook::l2_book`): a single lock guarding a small map, with readers
//! and writers distinguished by the operation's actual needs rather than
//! locking conservatively for every access.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::errors::CatalogError;

const LOCK_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ProductRow {
    pub price: Decimal,
    pub quantity: i64,
}

/// Result of a successful or failed `Order` call, matching the sentinel
/// values `spec.md` §4.1 assigns each outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOutcome {
    Success,
    InsufficientStock,
    InvalidQuantity,
    UnknownProduct,
}

impl OrderOutcome {
    pub fn as_sentinel(self) -> i64 {
        match self {
            OrderOutcome::Success => 1,
            OrderOutcome::InsufficientStock => -1,
            OrderOutcome::InvalidQuantity => -2,
            OrderOutcome::UnknownProduct => -3,
        }
    }
}

struct Inner {
    rows: HashMap<String, ProductRow>,
    dirty: bool,
}

/// The catalog's product table. Keys are fixed at startup from the seed
/// catalog and never added or removed, so membership checks never need the
/// lock (`spec.md` §4.1, §9 open question).
pub struct ProductTable {
    inner: RwLock<Inner>,
}

impl ProductTable {
    pub fn new(rows: HashMap<String, ProductRow>) -> Self {
        Self { inner: RwLock::new(Inner { rows, dirty: false }) }
    }

    pub fn contains(&self, product_name: &str) -> bool {
        // Safe without a lock: the key set is immutable after construction.
        self.inner.read().rows.contains_key(product_name)
    }

    /// `(-1, -1)` when the name is unknown; otherwise a consistent snapshot.
    pub fn query(&self, product_name: &str) -> Result<(Decimal, i64), CatalogError> {
        let guard = self.inner.try_read_for(LOCK_TIMEOUT).ok_or(CatalogError::LockTimeout)?;
        match guard.rows.get(product_name) {
            Some(row) => Ok((row.price, row.quantity)),
            None => Ok((-Decimal::ONE, -1)),
        }
    }

    /// Decrement `product_name` by `quantity`, or report why not.
    pub fn order(&self, product_name: &str, quantity: i64) -> Result<OrderOutcome, CatalogError> {
        if quantity < 1 {
            return Ok(OrderOutcome::InvalidQuantity);
        }
        if !self.contains(product_name) {
            return Ok(OrderOutcome::UnknownProduct);
        }

        let mut guard = self.inner.try_write_for(LOCK_TIMEOUT).ok_or(CatalogError::LockTimeout)?;
        let row = match guard.rows.get_mut(product_name) {
            Some(row) => row,
            None => return Ok(OrderOutcome::UnknownProduct),
        };
        if row.quantity < quantity {
            return Ok(OrderOutcome::InsufficientStock);
        }
        row.quantity -= quantity;
        guard.dirty = true;
        Ok(OrderOutcome::Success)
    }

    /// Names currently at zero stock, snapshotted under a read lock.
    pub fn depleted(&self) -> Vec<String> {
        self.inner
            .read()
            .rows
            .iter()
            .filter(|(_, row)| row.quantity == 0)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Restock `product_name` to `to_quantity`. No-op if it no longer exists
    /// (it always does; kept defensive since this runs off a stale snapshot).
    pub fn restock(&self, product_name: &str, to_quantity: i64) {
        let mut guard = self.inner.write();
        if let Some(row) = guard.rows.get_mut(product_name) {
            row.quantity = to_quantity;
            guard.dirty = true;
        }
    }

    /// Deep-copy every row for the durable writer, and report whether the
    /// table was dirty since the last call. Clears the dirty flag.
    pub fn snapshot_if_dirty(&self) -> Option<Vec<(String, ProductRow)>> {
        let mut guard = self.inner.write();
        if !guard.dirty {
            return None;
        }
        guard.dirty = false;
        Some(guard.rows.iter().map(|(name, row)| (name.clone(), row.clone())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn table_with(name: &str, price: Decimal, quantity: i64) -> ProductTable {
        let mut rows = HashMap::new();
        rows.insert(name.to_string(), ProductRow { price, quantity });
        ProductTable::new(rows)
    }

    #[test]
    fn query_unknown_product_returns_negative_one() {
        let table = table_with("Tux", dec!(19.99), 100);
        let (price, quantity) = table.query("Nonesuch").unwrap();
        assert_eq!(price, -Decimal::ONE);
        assert_eq!(quantity, -1);
    }

    #[test]
    fn order_decrements_stock_on_success() {
        let table = table_with("Tux", dec!(19.99), 100);
        let outcome = table.order("Tux", 1).unwrap();
        assert_eq!(outcome, OrderOutcome::Success);
        let (_, quantity) = table.query("Tux").unwrap();
        assert_eq!(quantity, 99);
    }

    #[test]
    fn order_rejects_invalid_quantity() {
        let table = table_with("Tux", dec!(19.99), 100);
        assert_eq!(table.order("Tux", 0).unwrap(), OrderOutcome::InvalidQuantity);
    }

    #[test]
    fn order_rejects_unknown_product() {
        let table = table_with("Tux", dec!(19.99), 100);
        assert_eq!(table.order("Nonesuch", 1).unwrap(), OrderOutcome::UnknownProduct);
    }

    #[test]
    fn order_reports_insufficient_stock_without_mutating() {
        let table = table_with("Tux", dec!(19.99), 1);
        assert_eq!(table.order("Tux", 2).unwrap(), OrderOutcome::InsufficientStock);
        let (_, quantity) = table.query("Tux").unwrap();
        assert_eq!(quantity, 1);
    }

    #[test]
    fn two_concurrent_orders_serialize() {
        use std::sync::Arc;
        let table = Arc::new(table_with("Tux", dec!(19.99), 10));
        let t1 = table.clone();
        let t2 = table.clone();
        let h1 = std::thread::spawn(move || t1.order("Tux", 1).unwrap());
        let h2 = std::thread::spawn(move || t2.order("Tux", 1).unwrap());
        assert_eq!(h1.join().unwrap(), OrderOutcome::Success);
        assert_eq!(h2.join().unwrap(), OrderOutcome::Success);
        let (_, quantity) = table.query("Tux").unwrap();
        assert_eq!(quantity, 8);
    }

    #[test]
    fn depleted_and_restock_round_trip() {
        let table = table_with("Tux", dec!(19.99), 0);
        assert_eq!(table.depleted(), vec!["Tux".to_string()]);
        table.restock("Tux", 100);
        assert!(table.depleted().is_empty());
        let (_, quantity) = table.query("Tux").unwrap();
        assert_eq!(quantity, 100);
    }
}
