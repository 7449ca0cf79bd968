use std::time::Duration;

use serde::{Deserialize, Serialize};
use toystore_core::rpc::{RpcClient, RpcError};

const CATALOG_QUERY_DEADLINE: Duration = Duration::from_secs(3);
const BUY_DEADLINE: Duration = Duration::from_secs(1);
const CHECK_DEADLINE: Duration = Duration::from_secs(3);
const PING_DEADLINE: Duration = Duration::from_secs(1);

#[derive(Serialize)]
struct QueryRequest<'a> {
    product_name: &'a str,
}

#[derive(Deserialize)]
pub struct QueryResponse {
    pub price: String,
    pub quantity: i64,
}

/// The front-end's read-side call into the catalog on a cache miss
/// (`spec.md` §4.1, §4.3).
#[derive(Clone)]
pub struct CatalogClient {
    rpc: RpcClient,
    addr: String,
}

impl CatalogClient {
    pub fn new(addr: String) -> Self {
        Self { rpc: RpcClient::new(), addr }
    }

    pub async fn query(&self, product_name: &str) -> Result<QueryResponse, RpcError> {
        let req = QueryRequest { product_name };
        self.rpc.call_json(&self.addr, "/rpc/query", &req, CATALOG_QUERY_DEADLINE).await
    }
}

#[derive(Serialize)]
struct BuyRequest<'a> {
    product_name: &'a str,
    quantity: i64,
}

#[derive(Deserialize)]
pub struct BuyResponse {
    pub order_number: i64,
}

#[derive(Serialize)]
struct CheckRequest {
    order_number: i64,
}

#[derive(Deserialize)]
pub struct CheckResponse {
    pub product_name: String,
    pub quantity: i64,
}

#[derive(Serialize)]
struct PingRequest {
    ping_number: i64,
}

#[derive(Deserialize)]
struct PingResponse {
    #[allow(dead_code)]
    ping_number: i64,
}

/// One order replica, as reached by the front-end for the write path
/// (`Buy`/`Check`) and for leader election (`Ping`).
#[derive(Clone)]
pub struct OrderClient {
    rpc: RpcClient,
    pub component_id: u8,
    addr: String,
}

impl OrderClient {
    pub fn new(component_id: u8, addr: String) -> Self {
        Self { rpc: RpcClient::new(), component_id, addr }
    }

    pub async fn buy(&self, product_name: &str, quantity: i64) -> Result<i64, RpcError> {
        let req = BuyRequest { product_name, quantity };
        let resp: BuyResponse = self.rpc.call_json(&self.addr, "/rpc/buy", &req, BUY_DEADLINE).await?;
        Ok(resp.order_number)
    }

    pub async fn check(&self, order_number: i64) -> Result<CheckResponse, RpcError> {
        let req = CheckRequest { order_number };
        self.rpc.call_json(&self.addr, "/rpc/check", &req, CHECK_DEADLINE).await
    }

    pub async fn ping(&self, ping_number: i64) -> Result<(), RpcError> {
        let req = PingRequest { ping_number };
        let _resp: PingResponse = self.rpc.call_json(&self.addr, "/rpc/ping", &req, PING_DEADLINE).await?;
        Ok(())
    }
}
