//! CSV persistence for the catalog table and the per-replica order log.
//!
//! Both formats are defined in `spec.md` §6. The catalog file is rewritten
//! in full on every flush (`toystore-catalog`'s durable writer); the order
//! log is append-only (`toystore-order`'s flusher never rewrites existing
//! rows).

pub mod catalog_csv;
pub mod log_csv;
