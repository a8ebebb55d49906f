//! Auxiliary lookup: one address or domain typed by the user after a search.

use crate::error::RevWhoixError;
use crate::protocols::{ReverseDns, SystemDns, WhoisClient, WhoisLookup};
use crate::types::{SearchConfig, WhoisRecord};
use crate::utils::{classify_lookup_input, LookupTarget};
use std::net::IpAddr;

/// Resolves an address to a host name when needed, then fetches its WHOIS
/// record.
pub struct AuxiliaryResolver<D = SystemDns, W = WhoisClient> {
    dns: D,
    whois: W,
}

impl AuxiliaryResolver<SystemDns, WhoisClient> {
    /// Resolver using the system DNS configuration and `whois` command.
    pub fn new(config: &SearchConfig) -> Self {
        Self::with_lookups(
            SystemDns::with_timeout(config.lookup_timeout),
            WhoisClient::with_timeout(config.lookup_timeout),
        )
    }
}

impl<D: ReverseDns, W: WhoisLookup> AuxiliaryResolver<D, W> {
    pub fn with_lookups(dns: D, whois: W) -> Self {
        Self { dns, whois }
    }

    /// Look up `input`, reporting why it failed.
    ///
    /// Address-like input goes through reverse DNS first; if that fails no
    /// WHOIS query is made.
    pub async fn try_resolve(&self, input: &str) -> Result<WhoisRecord, RevWhoixError> {
        let domain = match classify_lookup_input(input) {
            LookupTarget::Domain(domain) if domain.is_empty() => {
                return Err(RevWhoixError::resolution(input, "nothing to look up"));
            }
            LookupTarget::Domain(domain) => domain,
            LookupTarget::Address(addr) => {
                let ip: IpAddr = addr
                    .parse()
                    .map_err(|_| RevWhoixError::resolution(&addr, "not a valid IP address"))?;
                self.dns.reverse_lookup(ip).await?
            }
        };

        if domain.starts_with('-') {
            return Err(RevWhoixError::resolution(&domain, "not a valid domain name"));
        }

        tracing::debug!(domain = %domain, "querying WHOIS");
        self.whois.lookup(&domain).await
    }

    /// Look up `input`, or `None` if any step fails.
    ///
    /// Failures never end the program; they are logged and swallowed.
    pub async fn resolve(&self, input: &str) -> Option<WhoisRecord> {
        match self.try_resolve(input).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(input = input.trim(), error = %e, "auxiliary lookup failed");
                None
            }
        }
    }
}
