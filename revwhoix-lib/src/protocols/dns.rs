//! Reverse DNS for the auxiliary phase.

use crate::error::RevWhoixError;
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use std::time::Duration;

/// Something that can map an address back to a host name.
#[allow(async_fn_in_trait)]
pub trait ReverseDns {
    async fn reverse_lookup(&self, addr: IpAddr) -> Result<String, RevWhoixError>;
}

/// PTR lookups through the system resolver configuration.
#[derive(Clone)]
pub struct SystemDns {
    timeout: Duration,
}

impl SystemDns {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemDns {
    fn default() -> Self {
        Self::new()
    }
}

impl ReverseDns for SystemDns {
    async fn reverse_lookup(&self, addr: IpAddr) -> Result<String, RevWhoixError> {
        let target = addr.to_string();

        // Built per lookup: the CLI does at most one.
        let resolver = TokioAsyncResolver::tokio_from_system_conf().map_err(|e| {
            RevWhoixError::resolution(
                &target,
                format!("Failed to load system resolver configuration: {}", e),
            )
        })?;

        let lookup = tokio::time::timeout(self.timeout, resolver.reverse_lookup(addr))
            .await
            .map_err(|_| {
                RevWhoixError::resolution(
                    &target,
                    format!("reverse DNS timed out after {:?}", self.timeout),
                )
            })?
            .map_err(|e| {
                RevWhoixError::resolution(&target, format!("Could not resolve domain name: {}", e))
            })?;

        let host = lookup
            .iter()
            .next()
            .map(|name| name.to_string().trim_end_matches('.').to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| RevWhoixError::resolution(&target, "no PTR record"))?;

        tracing::debug!(addr = %target, host = %host, "reverse DNS resolved");
        Ok(host)
    }
}
