use std::net::SocketAddr;
use std::path::PathBuf;

use toystore_core::config::{env_parsed, env_string, socket_addr};

/// Another replica's addresses, as seen by this one.
#[derive(Debug, Clone)]
pub struct PeerAddr {
    pub component_id: u8,
    pub addr: String,
    pub recovery_addr: String,
}

/// Tuning knobs for one order replica, loaded from the environment
/// (`spec.md` §6). Each replica binds two listeners: the main surface
/// (`Buy`/`Check`/`Ping`/`Propagate`) and a separate recovery surface
/// (`BackOnline`/`RequestMissingLogs`), per `spec.md` §6's "separate
/// endpoint per replica" note for the recovery service.
#[derive(Debug, Clone)]
pub struct OrderConfig {
    pub component_id: u8,
    pub bind_addr: SocketAddr,
    pub recovery_bind_addr: SocketAddr,
    pub peers: Vec<PeerAddr>,
    pub catalog_addr: String,
    pub log_file: PathBuf,
    pub max_workers: usize,
}

impl OrderConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let component_id: u8 = env_parsed("COMPONENT_ID", 1u8);
        anyhow::ensure!((1..=3).contains(&component_id), "COMPONENT_ID must be 1, 2, or 3");

        let host = |id: u8| env_string(&format!("ORDER_HOST_{id}"), "127.0.0.1");
        let port = |id: u8| env_parsed(&format!("ORDER_PORT_{id}"), 1140u16 + id as u16);
        let recovery_port = |id: u8| env_parsed(&format!("ORDER2_PORT_{id}"), 1150u16 + id as u16);

        let bind_addr = socket_addr(&host(component_id), port(component_id))?;
        let recovery_bind_addr = socket_addr(&host(component_id), recovery_port(component_id))?;

        let peers = (1..=3u8)
            .filter(|id| *id != component_id)
            .map(|id| PeerAddr {
                component_id: id,
                addr: format!("{}:{}", host(id), port(id)),
                recovery_addr: format!("{}:{}", host(id), recovery_port(id)),
            })
            .collect();

        let catalog_host = env_string("CATALOG_HOST", "127.0.0.1");
        let catalog_port: u16 = env_parsed("CATALOG_PORT", 1130u16);

        let log_file_template = env_string("ORDER_LOG_FILE", "data/log{COMPONENT_ID}.csv");
        let log_file = PathBuf::from(log_file_template.replace("{COMPONENT_ID}", &component_id.to_string()));

        Ok(Self {
            component_id,
            bind_addr,
            recovery_bind_addr,
            peers,
            catalog_addr: format!("{catalog_host}:{catalog_port}"),
            log_file,
            max_workers: env_parsed("MAX_WORKERS", 100usize),
        })
    }
}
