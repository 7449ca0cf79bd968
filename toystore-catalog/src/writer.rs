//! Durable writer: once a second, if the table has been touched since the
//! last flush, deep-copy it under a read lock and atomically rewrite the
//! catalog CSV (`spec.md` §4.1, §6). Grounded on the workspace template's
//! `execution::journal::AsyncJournal` writer thread, adapted from an async
//! channel consumer to a polling snapshot since the table itself (not a
//! queue of events) is the thing being persisted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::table::ProductTable;
use toystore_core::csv_store::catalog_csv::{self, CatalogRow};
use toystore_core::shutdown::Shutdown;

const FLUSH_INTERVAL: Duration = Duration::from_secs(1);

pub async fn run(table: Arc<ProductTable>, catalog_file: PathBuf, mut shutdown: Shutdown) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!("durable writer shutting down");
                return;
            }
            _ = tokio::time::sleep(FLUSH_INTERVAL) => {}
        }

        let Some(rows) = table.snapshot_if_dirty() else { continue };
        let rows: Vec<CatalogRow> = rows
            .into_iter()
            .map(|(product_name, row)| CatalogRow {
                product_name,
                price: row.price.round_dp(2).to_string(),
                quantity: row.quantity,
            })
            .collect();

        if let Err(err) = catalog_csv::write_catalog(&catalog_file, &rows) {
            error!(%err, "failed to flush catalog file");
        }
    }
}
