/// Internal failure modes for the catalog. These never cross the RPC
/// boundary directly — `service.rs` translates them to the negative
/// sentinels `spec.md` §4.1 defines for `Query`/`Order`.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("timed out acquiring the product table lock")]
    LockTimeout,
    #[error("catalog file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog csv error: {0}")]
    Csv(anyhow::Error),
}
