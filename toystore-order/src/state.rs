//! The state one order replica owns: its log, its order-number counter, its
//! flush cursor, and the leader id it has most recently heard announced.
//!
//! `spec.md` §9 calls for a single mutex-guarded value per piece of process
//! state rather than scattered globals; §4.2 and §5 call for two distinct
//! locks (the order-number counter and the log itself) so that assigning a
//! number and inserting its record are two separable critical sections.
//! Grounded on the lock shape of the workspace template's
//! `orderbook::l2_book` (one lock per logically independent piece of book
//! state).

use std::collections::BTreeMap;

use parking_lot::{Mutex, RwLock};

#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub product_name: String,
    pub quantity: i64,
}

pub struct ReplicaState {
    pub component_id: u8,
    order_number: Mutex<i64>,
    log: RwLock<BTreeMap<i64, OrderRecord>>,
    write_cursor: Mutex<i64>,
    leader_id: Mutex<Option<u8>>,
}

impl ReplicaState {
    pub fn new(component_id: u8, next_order_number: i64, log: BTreeMap<i64, OrderRecord>) -> Self {
        Self {
            component_id,
            order_number: Mutex::new(next_order_number),
            write_cursor: Mutex::new(next_order_number),
            log: RwLock::new(log),
            leader_id: Mutex::new(None),
        }
    }

    /// Atomically take the next order number and advance the counter
    /// (`spec.md` §4.2 step 3 of the leader commit path).
    pub fn take_next_order_number(&self) -> i64 {
        let mut guard = self.order_number.lock();
        let n = *guard;
        *guard += 1;
        n
    }

    /// Follower-side counter advance: never goes backwards, tolerates
    /// out-of-order `Propagate` arrival (`spec.md` §4.2).
    pub fn advance_next_order_number_at_least(&self, at_least: i64) {
        let mut guard = self.order_number.lock();
        if at_least > *guard {
            *guard = at_least;
        }
    }

    pub fn next_order_number(&self) -> i64 {
        *self.order_number.lock()
    }

    pub fn insert(&self, order_number: i64, record: OrderRecord) {
        self.log.write().insert(order_number, record);
    }

    pub fn get(&self, order_number: i64) -> Option<OrderRecord> {
        self.log.read().get(&order_number).cloned()
    }

    pub fn contains(&self, order_number: i64) -> bool {
        self.log.read().contains_key(&order_number)
    }

    pub fn write_cursor(&self) -> i64 {
        *self.write_cursor.lock()
    }

    pub fn set_write_cursor(&self, value: i64) {
        *self.write_cursor.lock() = value;
    }

    /// Every record with `order_number >= write_cursor` currently held,
    /// contiguous from `write_cursor`, for the flusher to drain. Returns the
    /// records to append plus the cursor value after them.
    pub fn contiguous_run_from_cursor(&self) -> (Vec<(i64, OrderRecord)>, i64) {
        let log = self.log.read();
        let mut cursor = self.write_cursor();
        let mut run = Vec::new();
        while let Some(record) = log.get(&cursor) {
            run.push((cursor, record.clone()));
            cursor += 1;
        }
        (run, cursor)
    }

    /// Numbers below `next_order_number` that are absent from the log — the
    /// gap the flusher should request via recovery.
    pub fn missing_below(&self, upto_exclusive: i64) -> Vec<i64> {
        let log = self.log.read();
        (0..upto_exclusive).filter(|n| !log.contains_key(n)).collect()
    }

    pub fn set_leader(&self, id: u8) {
        *self.leader_id.lock() = Some(id);
    }

    pub fn leader(&self) -> Option<u8> {
        *self.leader_id.lock()
    }

    pub fn is_leader(&self) -> bool {
        self.leader() == Some(self.component_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_next_order_number_increments() {
        let state = ReplicaState::new(1, 0, BTreeMap::new());
        assert_eq!(state.take_next_order_number(), 0);
        assert_eq!(state.take_next_order_number(), 1);
        assert_eq!(state.next_order_number(), 2);
    }

    #[test]
    fn advance_never_goes_backwards() {
        let state = ReplicaState::new(1, 5, BTreeMap::new());
        state.advance_next_order_number_at_least(2);
        assert_eq!(state.next_order_number(), 5);
        state.advance_next_order_number_at_least(8);
        assert_eq!(state.next_order_number(), 8);
    }

    #[test]
    fn contiguous_run_stops_at_first_gap() {
        let state = ReplicaState::new(1, 0, BTreeMap::new());
        state.insert(0, OrderRecord { product_name: "Tux".into(), quantity: 1 });
        state.insert(2, OrderRecord { product_name: "Gnu".into(), quantity: 1 });
        let (run, cursor) = state.contiguous_run_from_cursor();
        assert_eq!(run.len(), 1);
        assert_eq!(cursor, 1);
        assert_eq!(state.missing_below(3), vec![1]);
    }

    #[test]
    fn leader_starts_unset_and_records_announcement() {
        let state = ReplicaState::new(2, 0, BTreeMap::new());
        assert_eq!(state.leader(), None);
        state.set_leader(2);
        assert!(state.is_leader());
    }
}
