//! NDJSON streaming, used by exactly one RPC in this system: an order
//! replica's `RequestMissingLogs`, the only operation `spec.md` §6 specifies
//! as bidirectional streaming. Every call site already knows the full list
//! of order numbers it wants before calling (see
//! `original_source/src/order/order.py`), so the request half travels as one
//! JSON body; the response half is genuinely streamed, one NDJSON line per
//! recovered log row, so a recovering replica can start applying entries
//! before the sender has produced all of them.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::Frame;
use hyper::Request;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use super::error::RpcError;
use super::server::RpcBody;

/// Wrap a channel of `T` into a streamed NDJSON response body. The server
/// handler spawns a producer task feeding `tx` and returns
/// `ndjson_stream_response(rx)` immediately, so the HTTP response headers go
/// out before the producer has finished.
pub fn ndjson_stream_response<T>(rx: mpsc::Receiver<T>) -> hyper::Response<RpcBody>
where
    T: Serialize + Send + 'static,
{
    let body_stream = ReceiverStream::new(rx).map(|item| {
        let mut line = serde_json::to_vec(&item).unwrap_or_default();
        line.push(b'\n');
        Ok(Frame::data(Bytes::from(line)))
    });
    let body: RpcBody = StreamBody::new(body_stream).boxed();
    hyper::Response::builder()
        .status(hyper::StatusCode::OK)
        .header("content-type", "application/x-ndjson")
        .body(body)
        .expect("static response is well-formed")
}

/// Call a streaming RPC: POST `request` as JSON to `addr`/`path`, then hand
/// back a channel that yields one decoded `T` per NDJSON line as it arrives
/// off the wire. The channel closes when the peer closes the response body;
/// a transport error while reading surfaces as a single `Err` item.
pub async fn call_streaming<Req, T>(
    addr: &str,
    path: &str,
    request: &Req,
    connect_timeout: Duration,
) -> Result<mpsc::Receiver<Result<T, RpcError>>, RpcError>
where
    Req: Serialize,
    T: DeserializeOwned + Send + 'static,
{
    let client: Client<HttpConnector, Full<Bytes>> = Client::builder(TokioExecutor::new()).build_http();

    let body = serde_json::to_vec(request).map_err(|err| RpcError::Codec(format!("encoding request: {err}")))?;
    let uri = format!("http://{addr}{path}");
    let http_request = Request::builder()
        .method("POST")
        .uri(&uri)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .map_err(|err| RpcError::Codec(format!("building request: {err}")))?;

    let response = match tokio::time::timeout(connect_timeout, client.request(http_request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => return Err(RpcError::Unreachable(addr.to_string(), err.to_string())),
        Err(_) => return Err(RpcError::Timeout(addr.to_string(), connect_timeout)),
    };

    if !response.status().is_success() {
        return Err(RpcError::Remote(format!("status {}", response.status())));
    }

    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(async move {
        let mut incoming = response.into_body();
        let mut buf = Vec::new();
        loop {
            match incoming.frame().await {
                Some(Ok(frame)) => {
                    let Ok(data) = frame.into_data() else { continue };
                    buf.extend_from_slice(&data);
                    while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                        let line: Vec<u8> = buf.drain(..=pos).collect();
                        let line = &line[..line.len() - 1];
                        if line.is_empty() {
                            continue;
                        }
                        let decoded = serde_json::from_slice::<T>(line)
                            .map_err(|err| RpcError::Codec(format!("decoding stream item: {err}")));
                        if tx.send(decoded).await.is_err() {
                            return;
                        }
                    }
                }
                Some(Err(err)) => {
                    let _ = tx.send(Err(RpcError::Unreachable(String::new(), err.to_string()))).await;
                    return;
                }
                None => return,
            }
        }
    });

    Ok(rx)
}
