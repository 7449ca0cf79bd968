//! A small JSON-over-HTTP RPC transport.
//!
//! `spec.md` §1 explicitly treats "the RPC serialization framework itself"
//! as an external collaborator, specified only at its interface — the
//! catalog, order, and front-end service contracts in `spec.md` §6 are
//! framework-agnostic ("any framework that supports unary and bidirectional
//! streaming works"). This module is that thin wrapper: every RPC is a POST
//! to a fixed path with a JSON (or, for the one streaming call, NDJSON)
//! body, served with the same `hyper`/`hyper-util` accept loop the
//! workspace template uses for its metrics endpoint.

mod client;
mod error;
mod server;
pub mod stream;

pub use client::RpcClient;
pub use error::RpcError;
pub use server::{full_body, serve, BoxFuture, DynHandler, Router, RouterBuilder, RpcBody};
