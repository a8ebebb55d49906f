//! Utility functions for input classification and validation.

use crate::error::RevWhoixError;
use std::net::IpAddr;

/// What the auxiliary lookup was asked about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTarget {
    /// Looks like an address; needs reverse DNS before WHOIS
    Address(String),
    /// Used as a domain name as-is
    Domain(String),
}

/// Classify one line of user input for the auxiliary lookup.
///
/// Dotted numeric strings ("8.8.8.8", but also "1.2.3") and literal IPv6
/// addresses are addresses; anything else is a domain. This is a syntactic
/// check only, so addresses may still fail to parse later.
pub fn classify_lookup_input(input: &str) -> LookupTarget {
    let input = input.trim();
    if is_dotted_numeric(input) || (input.contains(':') && input.parse::<IpAddr>().is_ok()) {
        LookupTarget::Address(input.to_string())
    } else {
        LookupTarget::Domain(input.to_string())
    }
}

/// Only ASCII digits and dots, with at least one digit.
pub fn is_dotted_numeric(input: &str) -> bool {
    !input.is_empty()
        && input.chars().all(|c| c.is_ascii_digit() || c == '.')
        && input.chars().any(|c| c.is_ascii_digit())
}

/// Validate a search keyword, returning it trimmed.
pub fn validate_keyword(keyword: &str) -> Result<&str, RevWhoixError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(RevWhoixError::config("Search keyword cannot be empty"));
    }
    Ok(keyword)
}
