use std::net::SocketAddr;

use toystore_core::config::{env_parsed, env_string, socket_addr};

/// One order replica's address, as seen by the front-end.
#[derive(Debug, Clone)]
pub struct OrderPeer {
    pub component_id: u8,
    pub addr: String,
}

/// Tuning knobs for the front-end process, loaded from the environment
/// (`spec.md` §6). Two listeners: the public HTTP API
/// (`RESTFUL_API_PORT`) and the RPC surface the catalog calls `Invalidate`
/// on (`FRONT_HOST`/`FRONT_PORT`).
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    pub http_bind_addr: SocketAddr,
    pub rpc_bind_addr: SocketAddr,
    pub catalog_addr: String,
    pub order_replicas: Vec<OrderPeer>,
    pub max_workers: usize,
}

impl FrontendConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let http_host = env_string("RESTFUL_API_HOST", "0.0.0.0");
        let http_port = env_parsed("RESTFUL_API_PORT", 1110u16);
        let rpc_host = env_string("FRONT_HOST", "127.0.0.1");
        let rpc_port = env_parsed("FRONT_PORT", 1111u16);

        let catalog_host = env_string("CATALOG_HOST", "127.0.0.1");
        let catalog_port: u16 = env_parsed("CATALOG_PORT", 1130u16);

        let order_replicas = (1..=3u8)
            .map(|id| {
                let host = env_string(&format!("ORDER_HOST_{id}"), "127.0.0.1");
                let port: u16 = env_parsed(&format!("ORDER_PORT_{id}"), 1140u16 + id as u16);
                OrderPeer { component_id: id, addr: format!("{host}:{port}") }
            })
            .collect();

        Ok(Self {
            http_bind_addr: socket_addr(&http_host, http_port)?,
            rpc_bind_addr: socket_addr(&rpc_host, rpc_port)?,
            catalog_addr: format!("{catalog_host}:{catalog_port}"),
            order_replicas,
            max_workers: env_parsed("MAX_WORKERS", 100usize),
        })
    }
}
