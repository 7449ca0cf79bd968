//! Shared plumbing for the distributed toy store.
//!
//! Every service (catalog, order replica, front-end) links against this
//! crate for configuration loading, logging setup, the JSON-over-HTTP RPC
//! transport, CSV persistence helpers, and a shutdown signal shared by the
//! periodic background workers each service runs.

pub mod config;
pub mod csv_store;
pub mod logging;
pub mod rpc;
pub mod shutdown;

pub use anyhow::{Error, Result};
