//! Periodic restock worker. Wakes every `RESTOCK_INTERVAL`, finds every
//! product sitting at zero stock, and raises it back to 100 (`spec.md`
//! §4.1). Grounded on the workspace template's periodic-sweep shape in
//! `engine::position_reconciliation`.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::invalidate::Invalidator;
use crate::table::ProductTable;
use toystore_core::shutdown::Shutdown;

const RESTOCK_QUANTITY: i64 = 100;

pub async fn run(
    table: Arc<ProductTable>,
    invalidator: Invalidator,
    interval: Duration,
    mut shutdown: Shutdown,
) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!("restocker shutting down");
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        for product_name in table.depleted() {
            table.restock(&product_name, RESTOCK_QUANTITY);
            info!(product_name, "restocked");
            invalidator.submit(product_name);
        }
    }
}
