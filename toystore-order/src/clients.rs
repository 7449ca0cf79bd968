use std::time::Duration;

use serde::{Deserialize, Serialize};
use toystore_core::rpc::{stream, RpcClient, RpcError};

const CATALOG_ORDER_DEADLINE: Duration = Duration::from_secs(3);
const PROPAGATE_DEADLINE: Duration = Duration::from_secs(1);
const PING_DEADLINE: Duration = Duration::from_secs(1);
const RECOVERY_DEADLINE: Duration = Duration::from_secs(3);

#[derive(Serialize)]
struct CatalogOrderRequest<'a> {
    product_name: &'a str,
    quantity: i64,
}

#[derive(Deserialize)]
struct CatalogOrderResponse {
    order_result: i64,
}

/// The leader's call into the catalog to decrement stock
/// (`spec.md` §4.2 step 2).
#[derive(Clone)]
pub struct CatalogClient {
    rpc: RpcClient,
    addr: String,
}

impl CatalogClient {
    pub fn new(addr: String) -> Self {
        Self { rpc: RpcClient::new(), addr }
    }

    pub async fn order(&self, product_name: &str, quantity: i64) -> Result<i64, RpcError> {
        let req = CatalogOrderRequest { product_name, quantity };
        let resp: CatalogOrderResponse =
            self.rpc.call_json(&self.addr, "/rpc/order", &req, CATALOG_ORDER_DEADLINE).await?;
        Ok(resp.order_result)
    }
}

#[derive(Serialize)]
struct PropagateRequest<'a> {
    order_number: i64,
    product_name: &'a str,
    quantity: i64,
}

#[derive(Deserialize)]
struct PingResponseWire {
    #[allow(dead_code)]
    ping_number: i64,
}

/// A single peer replica, as reached from the leader's propagation fan-out
/// or from the recovery protocol.
#[derive(Clone)]
pub struct PeerClient {
    rpc: RpcClient,
    pub component_id: u8,
    addr: String,
    recovery_addr: String,
}

impl PeerClient {
    pub fn new(component_id: u8, addr: String, recovery_addr: String) -> Self {
        Self { rpc: RpcClient::new(), component_id, addr, recovery_addr }
    }

    /// Best-effort replication of one committed record. Failures are the
    /// caller's to log and drop (`spec.md` §4.2 step 5).
    pub async fn propagate(&self, order_number: i64, product_name: &str, quantity: i64) -> Result<(), RpcError> {
        let req = PropagateRequest { order_number, product_name, quantity };
        let _resp: PingResponseWire =
            self.rpc.call_json(&self.addr, "/rpc/propagate", &req, PROPAGATE_DEADLINE).await?;
        Ok(())
    }

    /// `Ping(ping_number)`: `0` is a liveness probe, `>0` announces that id
    /// as leader.
    pub async fn ping(&self, ping_number: i64) -> Result<i64, RpcError> {
        #[derive(Serialize)]
        struct PingRequest {
            ping_number: i64,
        }
        let resp: PingResponseWire =
            self.rpc.call_json(&self.addr, "/rpc/ping", &PingRequest { ping_number }, PING_DEADLINE).await?;
        Ok(resp.ping_number)
    }

    /// `BackOnline`: ask a peer for its current `next_order_number`, to
    /// learn the range to recover (`spec.md` §4.2 startup recovery step 1).
    pub async fn back_online(&self) -> Result<i64, RpcError> {
        #[derive(Serialize)]
        struct Empty {}
        #[derive(Deserialize)]
        struct BackOnlineResponse {
            ping_number: i64,
        }
        let resp: BackOnlineResponse =
            self.rpc.call_json(&self.recovery_addr, "/rpc/back_online", &Empty {}, RECOVERY_DEADLINE).await?;
        Ok(resp.ping_number)
    }

    /// `RequestMissingLogs`: stream the given order numbers to the peer and
    /// receive back the corresponding records as they arrive.
    pub async fn request_missing_logs(
        &self,
        order_numbers: Vec<i64>,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<RecoveredRecord, RpcError>>, RpcError> {
        #[derive(Serialize)]
        struct RequestMissingLogsRequest {
            order_numbers: Vec<i64>,
            component_id: u8,
        }
        let req = RequestMissingLogsRequest { order_numbers, component_id: self.component_id };
        stream::call_streaming(&self.recovery_addr, "/rpc/request_missing_logs", &req, RECOVERY_DEADLINE).await
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecoveredRecord {
    pub order_number: i64,
    pub product_name: String,
    pub quantity: i64,
}
