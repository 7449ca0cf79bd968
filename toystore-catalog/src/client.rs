use std::time::Duration;

use serde::{Deserialize, Serialize};
use toystore_core::rpc::RpcClient;

const INVALIDATE_DEADLINE: Duration = Duration::from_secs(1);

#[derive(Serialize)]
struct InvalidateRequest<'a> {
    product_name: &'a str,
}

#[derive(Deserialize)]
struct InvalidateResponse {
    #[allow(dead_code)]
    response: i64,
}

/// The catalog's only outbound RPC: push a cache invalidation to the
/// front-end (`spec.md` §4.1, §6 `Invalidate`).
#[derive(Clone)]
pub struct FrontendClient {
    rpc: RpcClient,
    addr: String,
}

impl FrontendClient {
    pub fn new(addr: String) -> Self {
        Self { rpc: RpcClient::new(), addr }
    }

    pub async fn invalidate(&self, product_name: &str) -> anyhow::Result<()> {
        let req = InvalidateRequest { product_name };
        let _resp: InvalidateResponse =
            self.rpc.call_json(&self.addr, "/rpc/invalidate", &req, INVALIDATE_DEADLINE).await?;
        Ok(())
    }
}
