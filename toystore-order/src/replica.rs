//! Top-level assembly for one order replica process: load the durable log,
//! build the shared state, run startup recovery, then serve both listeners
//! and the flusher concurrently until shutdown.

use std::sync::Arc;

use tracing::info;

use toystore_core::csv_store::log_csv;
use toystore_core::shutdown::Shutdown;

use crate::clients::{CatalogClient, PeerClient};
use crate::config::OrderConfig;
use crate::state::{OrderRecord, ReplicaState};
use crate::{flusher, recovery, service};

pub async fn run(config: OrderConfig, shutdown: Shutdown) -> anyhow::Result<()> {
    let loaded = log_csv::read_or_reset(&config.log_file)?;
    let log = loaded
        .entries
        .into_iter()
        .map(|(n, (product_name, quantity))| (n, OrderRecord { product_name, quantity }))
        .collect();
    let state = Arc::new(ReplicaState::new(config.component_id, loaded.next_order_number, log));

    let catalog = CatalogClient::new(config.catalog_addr.clone());
    let peers: Vec<PeerClient> = config
        .peers
        .iter()
        .map(|peer| PeerClient::new(peer.component_id, peer.addr.clone(), peer.recovery_addr.clone()))
        .collect();

    info!(component_id = config.component_id, next_order_number = state.next_order_number(), "replica starting");
    recovery::recover_from_peers(&state, &peers).await;

    let recovery_handle = tokio::spawn(recovery::run(config.recovery_bind_addr, state.clone(), shutdown.clone()));
    let flusher_handle = tokio::spawn(flusher::run(state.clone(), config.log_file.clone(), peers.clone(), shutdown.clone()));
    let service_result = service::run(config, state, catalog, peers, shutdown).await;

    let _ = recovery_handle.await;
    let _ = flusher_handle.await;
    service_result
}
