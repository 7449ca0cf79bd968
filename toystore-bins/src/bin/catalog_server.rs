//! Catalog process entry point: owns product stock/price, serves `Query`
//! and `Order` over RPC (`spec.md` §4.1).

use clap::Parser;
use toystore_bins::common::{init_logging, CommonArgs};
use toystore_catalog::CatalogConfig;
use toystore_core::shutdown;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CommonArgs::parse();
    init_logging(&args.log_level)?;

    let config = CatalogConfig::from_env()?;
    let shutdown = shutdown::install()?;

    toystore_catalog::service::run(config, shutdown).await
}
