use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use super::error::RpcError;
use crate::shutdown::Shutdown;

pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Response body type every handler in this crate produces: either a
/// single JSON buffer (unary calls) or a streamed sequence of NDJSON frames
/// (the recovery service's `RequestMissingLogs`).
pub type RpcBody = http_body_util::combinators::BoxBody<Bytes, BoxError>;

/// A fully type-erased connection handler: takes the incoming request,
/// produces a response. Used directly by services (like the recovery
/// streaming endpoint) that need control over the response body; unary
/// JSON services instead build one via [`Router`].
pub type DynHandler =
    Arc<dyn Fn(Request<Incoming>) -> BoxFuture<'static, Result<Response<RpcBody>, hyper::Error>> + Send + Sync>;

pub fn full_body(bytes: Bytes) -> RpcBody {
    Full::new(bytes).map_err(|never: Infallible| -> BoxError { match never {} }).boxed()
}

fn json_response(status: StatusCode, bytes: Bytes) -> Response<RpcBody> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(full_body(bytes))
        .expect("static response is well-formed")
}

fn json_error(status: StatusCode, message: &str) -> Response<RpcBody> {
    let payload = serde_json::json!({ "error": message });
    json_response(status, Bytes::from(serde_json::to_vec(&payload).unwrap_or_default()))
}

type JsonHandler = Arc<dyn Fn(Bytes) -> BoxFuture<'static, Result<Bytes, RpcError>> + Send + Sync>;

/// A router of unary JSON RPC methods, each identified by its HTTP path.
/// Generalizes the workspace template's `monitoring::server` path dispatch
/// (`/metrics`, `/health`, …) to an arbitrary set of application methods.
#[derive(Clone)]
pub struct Router {
    routes: Arc<HashMap<String, JsonHandler>>,
}

#[derive(Default)]
pub struct RouterBuilder {
    routes: HashMap<String, JsonHandler>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler at `path`. The handler receives the raw request
    /// body bytes and returns the raw response body bytes (both JSON) —
    /// callers typically wrap `serde_json::from_slice`/`to_vec` in a small
    /// closure, see `toystore-catalog::service` for the pattern.
    pub fn route<F, Fut>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(Bytes) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Bytes, RpcError>> + Send + 'static,
    {
        self.routes.insert(path.to_string(), Arc::new(move |body| Box::pin(handler(body))));
        self
    }

    pub fn build(self) -> Router {
        Router { routes: Arc::new(self.routes) }
    }
}

impl Router {
    async fn dispatch(self, req: Request<Incoming>) -> Result<Response<RpcBody>, hyper::Error> {
        let path = req.uri().path().to_string();
        let Some(handler) = self.routes.get(&path).cloned() else {
            return Ok(json_error(StatusCode::NOT_FOUND, "no such rpc method"));
        };

        let body = match req.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) => return Ok(json_error(StatusCode::BAD_REQUEST, &err.to_string())),
        };

        match handler(body).await {
            Ok(bytes) => Ok(json_response(StatusCode::OK, bytes)),
            Err(RpcError::Codec(msg)) => Ok(json_error(StatusCode::BAD_REQUEST, &msg)),
            Err(err) => Ok(json_error(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())),
        }
    }

    /// Convert this router into a [`DynHandler`] so it can be passed to
    /// [`serve`] alongside hand-written streaming handlers.
    pub fn into_handler(self) -> DynHandler {
        Arc::new(move |req| {
            let router = self.clone();
            Box::pin(router.dispatch(req))
        })
    }
}

/// Accept loop shared by every service in this workspace: bind, loop
/// `accept()`, spawn one task per connection, serve HTTP/1.1 on it. Stops
/// when `shutdown` fires. Grounded on the workspace template's
/// `monitoring::server::MetricsServer::serve`.
pub async fn serve(addr: SocketAddr, handler: DynHandler, mut shutdown: Shutdown) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "rpc listener started");

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!(%addr, "rpc listener shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(err) => {
                        error!(%err, "failed to accept connection");
                        continue;
                    }
                };
                let handler = handler.clone();
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let service = service_fn(move |req| {
                        let handler = handler.clone();
                        async move { handler(req).await }
                    });
                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        debug!(%peer, %err, "connection error");
                    }
                });
            }
        }
    }
}
