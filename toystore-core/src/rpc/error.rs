use std::time::Duration;

/// Outcome of a failed RPC, classified the way every caller in this system
/// needs to branch on it: is the peer simply gone (front-end should run
/// election and retry; catalog/leader should drop and move on), or did the
/// call actually reach it and fail (a different error, surfaced as-is)?
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("rpc call to {0} timed out after {1:?}")]
    Timeout(String, Duration),
    #[error("peer {0} unreachable: {1}")]
    Unreachable(String, String),
    #[error("peer returned an error response: {0}")]
    Remote(String),
    #[error("failed to encode/decode rpc payload: {0}")]
    Codec(String),
}

impl RpcError {
    /// True for transport-level failures (connection refused, deadline
    /// exceeded) as opposed to an application-level error response. This is
    /// the distinction `spec.md` §4.3 and §7 call "unreachable" — it is what
    /// triggers front-end leader re-election and what the catalog/leader
    /// silently drop rather than retry.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, RpcError::Timeout(..) | RpcError::Unreachable(..))
    }
}
