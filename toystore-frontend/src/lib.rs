//! The front-end: terminates client HTTP requests, caches product info,
//! routes buys/checks to the elected order leader, and receives cache
//! invalidations pushed from the catalog.

pub mod cache;
pub mod clients;
pub mod config;
pub mod election;
pub mod frontend;
pub mod http;
pub mod invalidate_service;

pub use config::FrontendConfig;
