//! The client-facing HTTP surface (`spec.md` §6): `GET /products/<name>`,
//! `POST /orders`, `POST /orders/<order_number>`. Hand-rolled routing over
//! raw `hyper`, matching the abstraction level `spec.md` §1 treats "HTTP
//! parsing and routing" at — a thin wrapper, not a framework.

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;

use toystore_core::rpc::{full_body, RpcBody};

use crate::cache::{CachedProduct, ProductCache};
use crate::clients::CatalogClient;
use crate::election::Election;

pub struct AppState {
    pub cache: Arc<ProductCache>,
    pub catalog: CatalogClient,
    pub election: Arc<Election>,
}

fn json_body<T: Serialize>(status: StatusCode, value: &T) -> Response<RpcBody> {
    let bytes = Bytes::from(serde_json::to_vec(value).unwrap_or_default());
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(full_body(bytes))
        .expect("static response is well-formed")
}

fn status_only(status: StatusCode) -> Response<RpcBody> {
    Response::builder().status(status).body(full_body(Bytes::new())).expect("static response is well-formed")
}

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    data: T,
}

#[derive(Serialize)]
struct ProductPayload {
    name: String,
    price: String,
    quantity: i64,
}

#[derive(Serialize)]
struct OrderNumberPayload {
    order_number: i64,
}

#[derive(Serialize)]
struct OrderDetailsPayload {
    number: i64,
    name: String,
    quantity: i64,
}

#[derive(Deserialize)]
struct OrderRequestBody {
    name: String,
    quantity: i64,
}

pub async fn dispatch(state: Arc<AppState>, req: Request<Incoming>) -> Result<Response<RpcBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (&method, segments.as_slice()) {
        (&Method::GET, ["products", name]) => Ok(get_product(&state, name).await),
        (&Method::POST, ["orders"]) => Ok(post_order(&state, req).await),
        (&Method::POST, ["orders", order_number]) => Ok(post_order_check(&state, order_number).await),
        _ => Ok(status_only(StatusCode::NOT_FOUND)),
    }
}

async fn get_product(state: &AppState, name: &str) -> Response<RpcBody> {
    if let Some(cached) = state.cache.get(name) {
        return json_body(StatusCode::OK, &Envelope {
            data: ProductPayload { name: name.to_string(), price: cached.price, quantity: cached.quantity },
        });
    }

    match state.catalog.query(name).await {
        Ok(resp) if resp.quantity == -1 => status_only(StatusCode::NOT_FOUND),
        Ok(resp) => {
            state.cache.insert(name.to_string(), CachedProduct { price: resp.price.clone(), quantity: resp.quantity });
            json_body(StatusCode::OK, &Envelope {
                data: ProductPayload { name: name.to_string(), price: resp.price, quantity: resp.quantity },
            })
        }
        Err(err) => {
            error!(name, %err, "catalog query failed");
            status_only(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn post_order(state: &AppState, req: Request<Incoming>) -> Response<RpcBody> {
    let Some(content_type) = req.headers().get("content-type").and_then(|v| v.to_str().ok()) else {
        return status_only(StatusCode::BAD_REQUEST);
    };
    if !content_type.starts_with("application/json") {
        return status_only(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
    if req.headers().get("content-length").is_none() {
        return status_only(StatusCode::LENGTH_REQUIRED);
    }

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => return status_only(StatusCode::BAD_REQUEST),
    };
    let parsed: OrderRequestBody = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(_) => return status_only(StatusCode::BAD_REQUEST),
    };
    if parsed.quantity < 1 {
        return status_only(StatusCode::BAD_REQUEST);
    }

    loop {
        let Some(leader_id) = state.election.current_leader() else {
            state.election.elect_or_die().await;
            continue;
        };
        let Some(client) = state.election.client(leader_id) else {
            state.election.elect_or_die().await;
            continue;
        };

        match client.buy(&parsed.name, parsed.quantity).await {
            Ok(order_number) => {
                return match order_number {
                    -3 => status_only(StatusCode::NOT_FOUND),
                    -2 => status_only(StatusCode::BAD_REQUEST),
                    n => json_body(StatusCode::OK, &Envelope { data: OrderNumberPayload { order_number: n } }),
                };
            }
            Err(err) if err.is_unreachable() => {
                state.election.elect_or_die().await;
                continue;
            }
            Err(err) => {
                error!(%err, "buy rpc failed");
                return status_only(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }
}

async fn post_order_check(state: &AppState, order_number: &str) -> Response<RpcBody> {
    let Ok(order_number) = order_number.parse::<i64>() else {
        return status_only(StatusCode::BAD_REQUEST);
    };

    loop {
        let Some(leader_id) = state.election.current_leader() else {
            state.election.elect_or_die().await;
            continue;
        };
        let Some(client) = state.election.client(leader_id) else {
            state.election.elect_or_die().await;
            continue;
        };

        match client.check(order_number).await {
            Ok(resp) if resp.quantity == -1 => return status_only(StatusCode::NOT_FOUND),
            Ok(resp) => {
                return json_body(StatusCode::OK, &Envelope {
                    data: OrderDetailsPayload { number: order_number, name: resp.product_name, quantity: resp.quantity },
                });
            }
            Err(err) if err.is_unreachable() => {
                state.election.elect_or_die().await;
                continue;
            }
            Err(err) => {
                error!(%err, "check rpc failed");
                return status_only(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }
}
