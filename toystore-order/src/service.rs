//! Main RPC surface for one order replica: `Buy`, `Check`, `Ping`,
//! `Propagate` (`spec.md` §4.2, §6).

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::warn;

use toystore_core::rpc::{serve, RouterBuilder, RpcError};
use toystore_core::shutdown::Shutdown;

use crate::clients::{CatalogClient, PeerClient};
use crate::config::OrderConfig;
use crate::state::{OrderRecord, ReplicaState};

fn decode<T: for<'de> Deserialize<'de>>(body: Bytes) -> Result<T, RpcError> {
    serde_json::from_slice(&body).map_err(|err| RpcError::Codec(err.to_string()))
}

fn encode<T: Serialize>(value: &T) -> Result<Bytes, RpcError> {
    serde_json::to_vec(value).map(Bytes::from).map_err(|err| RpcError::Codec(err.to_string()))
}

#[derive(Deserialize)]
struct BuyRequest {
    product_name: String,
    quantity: i64,
}

#[derive(Serialize)]
struct BuyResponse {
    order_number: i64,
}

#[derive(Deserialize)]
struct CheckRequest {
    order_number: i64,
}

#[derive(Serialize)]
struct CheckResponse {
    product_name: String,
    quantity: i64,
}

#[derive(Deserialize)]
struct PingRequest {
    ping_number: i64,
}

#[derive(Serialize, Deserialize)]
struct PingResponse {
    ping_number: i64,
}

#[derive(Deserialize)]
struct PropagateRequest {
    order_number: i64,
    product_name: String,
    quantity: i64,
}

/// Fan out a committed record to every peer from a bounded pool of tasks,
/// dropping (and logging) failures rather than retrying
/// (`spec.md` §4.2 step 5).
fn spawn_propagation(
    peers: Vec<PeerClient>,
    semaphore: Arc<Semaphore>,
    order_number: i64,
    product_name: String,
    quantity: i64,
) {
    for peer in peers {
        let Ok(permit) = semaphore.clone().try_acquire_owned() else {
            warn!(order_number, peer = peer.component_id, "propagation pool saturated, dropping");
            continue;
        };
        let product_name = product_name.clone();
        tokio::spawn(async move {
            let _permit = permit;
            if let Err(err) = peer.propagate(order_number, &product_name, quantity).await {
                warn!(order_number, peer = peer.component_id, %err, "propagate failed, dropping");
            }
        });
    }
}

pub async fn run(
    config: OrderConfig,
    state: Arc<ReplicaState>,
    catalog: CatalogClient,
    peers: Vec<PeerClient>,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    let propagation_semaphore = Arc::new(Semaphore::new(config.max_workers));

    let buy_state = state.clone();
    let buy_peers = peers.clone();
    let buy_semaphore = propagation_semaphore.clone();

    let check_state = state.clone();
    let ping_state = state.clone();
    let propagate_state = state.clone();

    let router = RouterBuilder::new()
        .route("/rpc/buy", move |body| {
            let state = buy_state.clone();
            let catalog = catalog.clone();
            let peers = buy_peers.clone();
            let semaphore = buy_semaphore.clone();
            async move {
                let req: BuyRequest = decode(body)?;
                if req.quantity < 1 {
                    return encode(&BuyResponse { order_number: -2 });
                }

                let order_result = catalog
                    .order(&req.product_name, req.quantity)
                    .await
                    .map_err(|err| RpcError::Remote(err.to_string()))?;
                if order_result != 1 {
                    return encode(&BuyResponse { order_number: order_result });
                }

                let order_number = state.take_next_order_number();
                state.insert(order_number, OrderRecord {
                    product_name: req.product_name.clone(),
                    quantity: req.quantity,
                });
                spawn_propagation(peers, semaphore, order_number, req.product_name, req.quantity);

                encode(&BuyResponse { order_number })
            }
        })
        .route("/rpc/check", move |body| {
            let state = check_state.clone();
            async move {
                let req: CheckRequest = decode(body)?;
                let (product_name, quantity) = match state.get(req.order_number) {
                    Some(record) => (record.product_name, record.quantity),
                    None => (String::new(), -1),
                };
                encode(&CheckResponse { product_name, quantity })
            }
        })
        .route("/rpc/ping", move |body| {
            let state = ping_state.clone();
            async move {
                let req: PingRequest = decode(body)?;
                if req.ping_number > 0 {
                    state.set_leader(req.ping_number as u8);
                }
                encode(&PingResponse { ping_number: 0 })
            }
        })
        .route("/rpc/propagate", move |body| {
            let state = propagate_state.clone();
            async move {
                let req: PropagateRequest = decode(body)?;
                state.insert(req.order_number, OrderRecord {
                    product_name: req.product_name,
                    quantity: req.quantity,
                });
                state.advance_next_order_number_at_least(req.order_number + 1);
                encode(&PingResponse { ping_number: 0 })
            }
        })
        .build();

    serve(config.bind_addr, router.into_handler(), shutdown).await
}
