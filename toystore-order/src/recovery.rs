//! The recovery surface: `BackOnline` and `RequestMissingLogs`
//! (`spec.md` §4.2, §6), served on a separate listener from the main
//! `Buy`/`Check`/`Ping`/`Propagate` surface. Also the startup recovery
//! procedure that drives the client side of this protocol against each
//! peer in turn.

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use toystore_core::rpc::{full_body, serve, stream, BoxFuture, DynHandler, RpcBody, RpcError};
use toystore_core::shutdown::Shutdown;

use crate::clients::{PeerClient, RecoveredRecord};
use crate::state::ReplicaState;

#[derive(Serialize)]
struct BackOnlineResponse {
    ping_number: i64,
}

#[derive(Deserialize)]
struct RequestMissingLogsRequest {
    order_numbers: Vec<i64>,
    #[allow(dead_code)]
    component_id: u8,
}

fn json_error(status: StatusCode, message: &str) -> Response<RpcBody> {
    let payload = serde_json::json!({ "error": message });
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(full_body(Bytes::from(serde_json::to_vec(&payload).unwrap_or_default())))
        .expect("static response is well-formed")
}

async fn dispatch(state: Arc<ReplicaState>, req: Request<Incoming>) -> Result<Response<RpcBody>, hyper::Error> {
    match req.uri().path() {
        "/rpc/back_online" => {
            let payload = BackOnlineResponse { ping_number: state.next_order_number() };
            let bytes = Bytes::from(serde_json::to_vec(&payload).unwrap_or_default());
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header("content-type", "application/json")
                .body(full_body(bytes))
                .expect("static response is well-formed"))
        }
        "/rpc/request_missing_logs" => {
            let body = match req.into_body().collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(err) => return Ok(json_error(StatusCode::BAD_REQUEST, &err.to_string())),
            };
            let parsed: RequestMissingLogsRequest = match serde_json::from_slice(&body) {
                Ok(parsed) => parsed,
                Err(err) => return Ok(json_error(StatusCode::BAD_REQUEST, &err.to_string())),
            };

            let (tx, rx) = mpsc::channel::<RecoveredRecord>(32);
            tokio::spawn(async move {
                for order_number in parsed.order_numbers {
                    match state.get(order_number) {
                        Some(record) => {
                            let item = RecoveredRecord {
                                order_number,
                                product_name: record.product_name,
                                quantity: record.quantity,
                            };
                            if tx.send(item).await.is_err() {
                                return;
                            }
                        }
                        None => warn!(order_number, "recovery requested a number this replica doesn't have"),
                    }
                }
            });

            Ok(stream::ndjson_stream_response(rx))
        }
        _ => Ok(json_error(StatusCode::NOT_FOUND, "no such rpc method")),
    }
}

pub async fn run(bind_addr: std::net::SocketAddr, state: Arc<ReplicaState>, shutdown: Shutdown) -> anyhow::Result<()> {
    let handler: DynHandler = Arc::new(move |req| {
        let state = state.clone();
        Box::pin(dispatch(state, req)) as BoxFuture<'static, _>
    });
    info!(%bind_addr, "recovery listener starting");
    serve(bind_addr, handler, shutdown).await
}

/// Startup recovery (`spec.md` §4.2): for each peer in turn, learn its
/// `next_order_number` via `BackOnline`, request every number this replica
/// is missing below it, and stop at the first peer that answers
/// successfully.
pub async fn recover_from_peers(state: &ReplicaState, peers: &[PeerClient]) {
    for peer in peers {
        match try_recover_from(state, peer).await {
            Ok(count) => {
                info!(peer = peer.component_id, recovered = count, "recovery complete");
                return;
            }
            Err(err) => {
                warn!(peer = peer.component_id, %err, "recovery from peer failed, trying next");
            }
        }
    }
    warn!("recovery exhausted all peers without success");
}

async fn try_recover_from(state: &ReplicaState, peer: &PeerClient) -> Result<usize, RpcError> {
    let max = peer.back_online().await?;
    let own_next = state.next_order_number();
    if own_next >= max {
        return Ok(0);
    }
    let wanted: Vec<i64> = (own_next..max).collect();
    recover_numbers(state, peer, wanted).await
}

/// Request a specific, possibly non-contiguous, list of missing numbers
/// from `peer` (used both by startup recovery and by the flusher's gap
/// detection).
pub async fn recover_numbers(state: &ReplicaState, peer: &PeerClient, wanted: Vec<i64>) -> Result<usize, RpcError> {
    if wanted.is_empty() {
        return Ok(0);
    }
    let mut rx = peer.request_missing_logs(wanted).await?;
    let mut max_received = -1i64;
    let mut count = 0usize;
    while let Some(item) = rx.recv().await {
        match item {
            Ok(record) => {
                state.insert(record.order_number, crate::state::OrderRecord {
                    product_name: record.product_name,
                    quantity: record.quantity,
                });
                max_received = max_received.max(record.order_number);
                count += 1;
            }
            Err(err) => return Err(err),
        }
    }
    if max_received >= 0 {
        state.advance_next_order_number_at_least(max_received + 1);
    }
    Ok(count)
}
