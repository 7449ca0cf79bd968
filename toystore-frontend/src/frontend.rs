//! Top-level assembly for the front-end process: build the cache and order
//! clients, run startup election, then serve the HTTP API, the invalidation
//! RPC endpoint, and the leader watchdog concurrently until shutdown.

use std::sync::Arc;

use tracing::info;

use toystore_core::rpc::{serve, BoxFuture, DynHandler};
use toystore_core::shutdown::Shutdown;

use crate::cache::ProductCache;
use crate::clients::{CatalogClient, OrderClient};
use crate::config::FrontendConfig;
use crate::election::{self, Election};
use crate::http::{self, AppState};
use crate::invalidate_service;

pub async fn run(config: FrontendConfig, shutdown: Shutdown) -> anyhow::Result<()> {
    let catalog = CatalogClient::new(config.catalog_addr.clone());
    let order_clients: Vec<OrderClient> =
        config.order_replicas.iter().map(|peer| OrderClient::new(peer.component_id, peer.addr.clone())).collect();

    let election = Arc::new(Election::new(order_clients));
    info!("running startup election");
    election.elect_or_die().await;

    let cache = Arc::new(ProductCache::new());
    let app_state = Arc::new(AppState { cache: cache.clone(), catalog, election: election.clone() });

    let watchdog = tokio::spawn(election::run_watchdog(election.clone(), shutdown.clone()));
    let invalidate = tokio::spawn(invalidate_service::run(config.rpc_bind_addr, cache, shutdown.clone()));

    let handler: DynHandler = Arc::new(move |req| {
        let app_state = app_state.clone();
        Box::pin(http::dispatch(app_state, req)) as BoxFuture<'static, _>
    });

    info!(addr = %config.http_bind_addr, "front-end http api starting");
    let http_result = serve(config.http_bind_addr, handler, shutdown).await;

    let _ = watchdog.await;
    let _ = invalidate.await;
    http_result
}
