//! Logging and panic-handling setup shared by every binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global `tracing` subscriber. `default_level` is used when
/// `RUST_LOG` is not set.
pub fn init_logging(default_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();

    Ok(())
}

/// Install a panic hook that logs via `tracing` before the default hook
/// prints to stderr, so a crashed worker thread leaves a trace in whatever
/// log sink the process is configured with.
pub fn install_panic_logging() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "<unknown location>".to_string());
        let message = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "<no message>".to_string()
        };
        tracing::error!(location = %location, message = %message, "worker thread panicked");
        default_hook(info);
    }));
}
