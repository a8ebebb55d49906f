//! Network protocol implementations.
//!
//! This module contains the reverse WHOIS API transport and the two lookups
//! used by the auxiliary phase: reverse DNS and WHOIS.

/// Reverse DNS (PTR) lookups
pub mod dns;

/// WhoisXML reverse WHOIS API over HTTPS
pub mod reverse_whois;

/// WHOIS via the system `whois` command
pub mod whois;

// Re-export commonly used functions and types
pub use dns::{ReverseDns, SystemDns};
pub use reverse_whois::{parse_search_response, ReverseWhoisClient, SearchTransport};
pub use whois::{parse_whois_output, WhoisClient, WhoisLookup};
