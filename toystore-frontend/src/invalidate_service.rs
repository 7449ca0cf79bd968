//! The front-end's own RPC surface: `Invalidate(product_name)`
//! (`spec.md` §4.3, §6). The catalog is the only caller.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use toystore_core::rpc::{serve, RouterBuilder, RpcError};
use toystore_core::shutdown::Shutdown;

use crate::cache::ProductCache;

#[derive(Deserialize)]
struct InvalidateRequest {
    product_name: String,
}

#[derive(Serialize)]
struct InvalidateResponse {
    response: i64,
}

pub async fn run(bind_addr: std::net::SocketAddr, cache: Arc<ProductCache>, shutdown: Shutdown) -> anyhow::Result<()> {
    let router = RouterBuilder::new()
        .route("/rpc/invalidate", move |body: Bytes| {
            let cache = cache.clone();
            async move {
                let req: InvalidateRequest =
                    serde_json::from_slice(&body).map_err(|err| RpcError::Codec(err.to_string()))?;
                cache.invalidate(&req.product_name);
                serde_json::to_vec(&InvalidateResponse { response: 0 })
                    .map(Bytes::from)
                    .map_err(|err| RpcError::Codec(err.to_string()))
            }
        })
        .build();

    serve(bind_addr, router.into_handler(), shutdown).await
}
