//! Order replica process entry point. `COMPONENT_ID` (1, 2, or 3) selects
//! which replica identity this process runs as (`spec.md` §4.2, §6).

use clap::Parser;
use toystore_bins::common::{init_logging, CommonArgs};
use toystore_core::shutdown;
use toystore_order::OrderConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CommonArgs::parse();
    init_logging(&args.log_level)?;

    let config = OrderConfig::from_env()?;
    let shutdown = shutdown::install()?;

    toystore_order::replica::run(config, shutdown).await
}
