//! Environment-variable configuration loading.
//!
//! Every component reads its tuning knobs from environment variables with
//! documented defaults (`spec.md` §6). This module centralizes the parsing
//! so each service's `config.rs` only has to declare field names and
//! defaults, not re-derive `std::env::var` error handling.

use std::net::SocketAddr;
use std::str::FromStr;

/// Read an environment variable, falling back to `default` if unset or empty.
pub fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read and parse an environment variable, falling back to `default` on
/// absence or parse failure. A malformed value is logged and treated as
/// absent rather than making the process fail to start.
pub fn env_parsed<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) if !raw.is_empty() => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, raw, "invalid environment value, using default");
            default
        }),
        _ => default,
    }
}

/// Build a `host:port` socket address from separately configured host and
/// port environment variables, resolving `host` through the standard
/// resolver (so both literal IPs and `localhost` work).
pub fn socket_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    use std::net::ToSocketAddrs;
    format!("{host}:{port}")
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| anyhow::anyhow!("could not resolve {host}:{port}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_string_falls_back() {
        assert_eq!(env_string("TOYSTORE_DOES_NOT_EXIST", "fallback"), "fallback");
    }

    #[test]
    fn env_parsed_falls_back_on_garbage() {
        std::env::set_var("TOYSTORE_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_parsed::<u16>("TOYSTORE_TEST_GARBAGE", 42), 42);
        std::env::remove_var("TOYSTORE_TEST_GARBAGE");
    }

    #[test]
    fn env_parsed_reads_value() {
        std::env::set_var("TOYSTORE_TEST_VALUE", "7");
        assert_eq!(env_parsed::<u16>("TOYSTORE_TEST_VALUE", 42), 7);
        std::env::remove_var("TOYSTORE_TEST_VALUE");
    }
}
