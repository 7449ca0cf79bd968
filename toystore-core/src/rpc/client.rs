use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::Request;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::RpcError;

/// A JSON RPC client shared across every peer a service talks to — the
/// front-end's catalog/order clients, the catalog's front-end-invalidation
/// client, and each order replica's peer/recovery clients are all thin
/// wrappers around one of these.
#[derive(Clone)]
pub struct RpcClient {
    inner: Client<HttpConnector, Full<Bytes>>,
}

impl Default for RpcClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcClient {
    pub fn new() -> Self {
        Self { inner: Client::builder(TokioExecutor::new()).build_http() }
    }

    /// Call `addr` (e.g. `"127.0.0.1:1130"`) at `path` with a JSON-encoded
    /// `req`, decoding a JSON `Resp` from the response body. Transport
    /// failures and elapsed deadlines are reported as
    /// [`RpcError::is_unreachable`]-true variants so callers can branch on
    /// "peer is gone" without inspecting the error further.
    pub async fn call_json<Req, Resp>(
        &self,
        addr: &str,
        path: &str,
        req: &Req,
        timeout: Duration,
    ) -> Result<Resp, RpcError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let body =
            serde_json::to_vec(req).map_err(|err| RpcError::Codec(format!("encoding request: {err}")))?;

        let uri = format!("http://{addr}{path}");
        let request = Request::builder()
            .method("POST")
            .uri(&uri)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|err| RpcError::Codec(format!("building request: {err}")))?;

        let call = self.inner.request(request);
        let response = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(RpcError::Unreachable(addr.to_string(), err.to_string())),
            Err(_) => return Err(RpcError::Timeout(addr.to_string(), timeout)),
        };

        let status = response.status();
        let collected = response
            .into_body()
            .collect()
            .await
            .map_err(|err| RpcError::Unreachable(addr.to_string(), err.to_string()))?
            .to_bytes();

        if !status.is_success() {
            let message = String::from_utf8_lossy(&collected).into_owned();
            return Err(RpcError::Remote(message));
        }

        serde_json::from_slice(&collected).map_err(|err| RpcError::Codec(format!("decoding response: {err}")))
    }
}
