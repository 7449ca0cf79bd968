use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use toystore_core::config::{env_parsed, env_string, socket_addr};

/// Tuning knobs for one catalog process, loaded from the environment
/// (`spec.md` §6).
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub bind_addr: SocketAddr,
    pub front_addr: String,
    pub catalog_file: PathBuf,
    pub max_workers: usize,
    pub restock_interval: Duration,
}

impl CatalogConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env_string("CATALOG_HOST", "0.0.0.0");
        let port = env_parsed("CATALOG_PORT", 1130u16);
        let front_host = env_string("FRONT_HOST", "127.0.0.1");
        let front_port = env_parsed("FRONT_PORT", 1111u16);

        Ok(Self {
            bind_addr: socket_addr(&host, port)?,
            front_addr: format!("{front_host}:{front_port}"),
            catalog_file: PathBuf::from(env_string("CATALOG_FILE", "data/catalog.csv")),
            max_workers: env_parsed("MAX_WORKERS", 100usize),
            restock_interval: Duration::from_secs(env_parsed("RESTOCK_INTERVAL", 10u64)),
        })
    }
}
