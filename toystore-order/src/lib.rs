//! One order replica: accepts buys (as leader), assigns order numbers,
//! replicates to peers, answers `Check`/`Ping`, and runs gap-filling
//! recovery against its peers on startup and whenever the flusher detects a
//! hole in the log.

pub mod clients;
pub mod config;
pub mod flusher;
pub mod recovery;
pub mod replica;
pub mod service;
pub mod state;

pub use config::OrderConfig;
pub use state::ReplicaState;
