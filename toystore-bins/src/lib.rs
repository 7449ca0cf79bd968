//! Shared initialization for all binaries: CLI parsing and logging setup.

pub mod common;
