//! Core data types for reverse WHOIS searches.
//!
//! This module defines the wire shapes exchanged with the reverse WHOIS API,
//! the search configuration, and the record produced by the auxiliary lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default reverse WHOIS API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://reverse-whois.whoisxmlapi.com/api/v2";

/// Result count at or above which the API paginates.
pub const DEFAULT_PAGE_SIZE: u64 = 10_000;

/// Upper bound on `max_pages`, whatever the configuration says.
pub const MAX_PAGES_LIMIT: usize = 1_000;

/// Which registration records the API searches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Only current registrations
    #[default]
    Current,
    /// Historic registrations as well
    Historic,
}

/// Query mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Returns only `domainsCount`
    Preview,
    /// Returns the domain list, paginated
    Purchase,
}

/// Opaque pagination cursor handed back by the API.
///
/// The API has used both integers and strings here; it is passed back verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SearchCursor(pub serde_json::Value);

impl fmt::Display for SearchCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

/// Search terms block of a request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BasicSearchTerms {
    pub include: Vec<String>,
}

/// Request body sent to the reverse WHOIS API.
///
/// Built once per logical query. Only `search_after` changes between pages.
#[derive(Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub api_key: String,
    pub search_type: SearchType,
    pub mode: SearchMode,
    pub punycode: bool,
    pub basic_search_terms: BasicSearchTerms,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_after: Option<SearchCursor>,
}

impl SearchRequest {
    /// Build a first-page request for a single keyword.
    pub fn new(api_key: &str, keyword: &str, mode: SearchMode, config: &SearchConfig) -> Self {
        Self {
            api_key: api_key.to_string(),
            search_type: config.search_type,
            mode,
            punycode: config.punycode,
            basic_search_terms: BasicSearchTerms {
                include: vec![keyword.to_string()],
            },
            search_after: None,
        }
    }
}

// The API key must not end up in logs.
impl fmt::Debug for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchRequest")
            .field("api_key", &"<redacted>")
            .field("search_type", &self.search_type)
            .field("mode", &self.mode)
            .field("punycode", &self.punycode)
            .field("basic_search_terms", &self.basic_search_terms)
            .field("search_after", &self.search_after)
            .finish()
    }
}

/// Response body from the reverse WHOIS API.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub domains_count: u64,
    #[serde(default)]
    pub domains_list: Vec<String>,
    #[serde(default)]
    pub next_page_search_after: Option<SearchCursor>,
}

/// Configuration for the search and the auxiliary lookup.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Reverse WHOIS API endpoint
    pub endpoint: String,

    /// HTTP request timeout
    /// Default: 30 seconds
    pub timeout: Duration,

    /// Maximum number of purchase-mode pages fetched for one keyword
    /// Default: 100, Range: 1-1000
    pub max_pages: usize,

    /// `domainsCount` at or above which another page is expected
    /// Default: 10,000
    pub page_size: u64,

    /// Ask the API for punycode domain names
    pub punycode: bool,

    /// Current or historic registrations
    pub search_type: SearchType,

    /// Timeout for each auxiliary lookup (reverse DNS, system `whois`)
    /// Default: 10 seconds
    pub lookup_timeout: Duration,

    /// API key file; `None` means the default per-user location
    pub credential_path: Option<PathBuf>,

    /// User-Agent header sent with every API request
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
            max_pages: 100,
            page_size: DEFAULT_PAGE_SIZE,
            punycode: true,
            search_type: SearchType::Current,
            lookup_timeout: Duration::from_secs(10),
            credential_path: None,
            user_agent: format!("revwhoix/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SearchConfig {
    /// Set the API endpoint.
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the HTTP request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the page bound. Clamped to 1..=1000.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.clamp(1, MAX_PAGES_LIMIT);
        self
    }

    /// Override the pagination threshold.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the auxiliary lookup timeout.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the credential file location.
    pub fn with_credential_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.credential_path = Some(path.into());
        self
    }
}

/// One field of a WHOIS record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WhoisField {
    pub name: String,
    pub value: String,
}

/// Field/value mapping produced by a WHOIS lookup.
///
/// Fields keep the order in which they first appeared in the server's answer.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct WhoisRecord {
    /// Domain the record was fetched for
    pub domain: String,
    fields: Vec<WhoisField>,
}

impl WhoisRecord {
    pub fn new<S: Into<String>>(domain: S) -> Self {
        Self {
            domain: domain.into(),
            fields: Vec::new(),
        }
    }

    /// Add a value. Repeated field names are merged into one comma-separated value.
    pub fn insert(&mut self, name: &str, value: &str) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            let already_present = field.value.split(", ").any(|v| v == value);
            if !already_present {
                field.value.push_str(", ");
                field.value.push_str(value);
            }
        } else {
            self.fields.push(WhoisField {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn fields(&self) -> &[WhoisField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl fmt::Display for WhoisField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Preview => write!(f, "preview"),
            SearchMode::Purchase => write!(f, "purchase"),
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchType::Current => write!(f, "current"),
            SearchType::Historic => write!(f, "historic"),
        }
    }
}
