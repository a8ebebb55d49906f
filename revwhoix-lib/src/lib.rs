//! # revwhoix Library
//!
//! Reverse WHOIS searches against the WhoisXML API: find every domain whose
//! registration data mentions a keyword (a company name, an email address, a
//! registrant...), then optionally look up one host's WHOIS record.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use revwhoix_lib::{default_credential_path, load_credential, ReverseWhoisSearcher, SearchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api_key = load_credential(default_credential_path())?;
//!     let searcher = ReverseWhoisSearcher::new(api_key, SearchConfig::default())?;
//!
//!     if searcher.probe("admin@example.com").await? {
//!         searcher.fetch("admin@example.com", |domain| println!("{}", domain)).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Preview probe**: one cheap request tells whether anything matches
//! - **Bounded pagination**: results stream page by page, with a page limit
//! - **Auxiliary lookup**: reverse DNS for addresses, then WHOIS
//! - **Layered configuration**: TOML files and RW_* environment variables

// Re-export main public API types and functions
// This makes them available as revwhoix_lib::TypeName
pub use config::{
    load_env_config, load_env_config_from, parse_timeout_string, ConfigManager,
    CredentialsSection, EnvConfig, FileConfig, LookupSection, SearchSection,
};
pub use credentials::{default_credential_path, load_credential, ApiKey};
pub use error::RevWhoixError;
pub use protocols::{
    parse_search_response, parse_whois_output, ReverseDns, ReverseWhoisClient, SearchTransport,
    SystemDns, WhoisClient, WhoisLookup,
};
pub use resolver::AuxiliaryResolver;
pub use searcher::ReverseWhoisSearcher;
pub use types::{
    BasicSearchTerms, SearchConfig, SearchCursor, SearchMode, SearchRequest, SearchResponse,
    SearchType, WhoisField, WhoisRecord, DEFAULT_ENDPOINT, DEFAULT_PAGE_SIZE, MAX_PAGES_LIMIT,
};
pub use user_agent::{random_user_agent, USER_AGENTS};
pub use utils::{classify_lookup_input, LookupTarget};

// Internal modules - these are not part of the public API
mod config;
mod credentials;
mod error;
mod protocols;
mod resolver;
mod searcher;
mod types;
mod user_agent;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, RevWhoixError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
