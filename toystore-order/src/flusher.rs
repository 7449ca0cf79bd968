//! The durable log flusher (`spec.md` §4.2, §9 "gap-filling recovery"):
//! once a second, append every contiguous record since the write cursor to
//! the CSV file, then — if the log has a gap below `next_order_number` —
//! call recovery against each peer to close it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use toystore_core::csv_store::log_csv::{self, LogRow};
use toystore_core::shutdown::Shutdown;

use crate::clients::PeerClient;
use crate::recovery;
use crate::state::ReplicaState;

const FLUSH_INTERVAL: Duration = Duration::from_secs(1);

pub async fn run(state: Arc<ReplicaState>, log_file: PathBuf, peers: Vec<PeerClient>, mut shutdown: Shutdown) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!("flusher shutting down");
                return;
            }
            _ = tokio::time::sleep(FLUSH_INTERVAL) => {}
        }

        let (run, new_cursor) = state.contiguous_run_from_cursor();
        if !run.is_empty() {
            let rows: Vec<LogRow> = run
                .into_iter()
                .map(|(order_number, record)| LogRow {
                    order_number,
                    product_name: record.product_name,
                    quantity: record.quantity,
                })
                .collect();
            if let Err(err) = log_csv::append(&log_file, &rows) {
                error!(%err, "failed to append to order log");
                continue;
            }
            state.set_write_cursor(new_cursor);
        }

        let next = state.next_order_number();
        if new_cursor < next {
            let missing = state.missing_below(next);
            if !missing.is_empty() {
                for peer in &peers {
                    if recovery::recover_numbers(&state, peer, missing.clone()).await.is_ok() {
                        break;
                    }
                }
            }
        }
    }
}
