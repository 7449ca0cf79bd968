//! Front-end process entry point: terminates client HTTP requests, caches
//! product info, and routes buys/checks to the elected order leader
//! (`spec.md` §4.3).

use clap::Parser;
use toystore_bins::common::{init_logging, CommonArgs};
use toystore_core::shutdown;
use toystore_frontend::FrontendConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CommonArgs::parse();
    init_logging(&args.log_level)?;

    let config = FrontendConfig::from_env()?;
    let shutdown = shutdown::install()?;

    toystore_frontend::frontend::run(config, shutdown).await
}
