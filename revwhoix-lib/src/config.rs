//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and RW_*
//! environment variables, and merging them with proper precedence rules.

use crate::error::RevWhoixError;
use crate::types::{SearchConfig, SearchType, MAX_PAGES_LIMIT};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
///
/// Every section and key is optional; anything left out keeps the value from
/// a lower-precedence file or the built-in default.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Reverse WHOIS API settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchSection>,

    /// Auxiliary lookup settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<LookupSection>,

    /// Where the API key lives
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CredentialsSection>,
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchSection {
    /// API endpoint URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// HTTP request timeout (as string, e.g., "30s", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Upper bound on result pages per keyword
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,

    /// Ask the API to return IDN domains in punycode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub punycode: Option<bool>,

    /// "current" or "historic"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,
}

/// `[lookup]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LookupSection {
    /// Timeout for reverse DNS and for the `whois` command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// `[credentials]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CredentialsSection {
    /// Path of the file holding the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Default)]
pub struct ConfigManager;

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a specific file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error if reading, parsing or
    /// validation fails.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, RevWhoixError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| {
            RevWhoixError::config(format!(
                "Failed to read configuration file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            RevWhoixError::config(format!(
                "Failed to parse TOML configuration '{}': {}",
                path.display(),
                e
            ))
        })?;

        self.validate_config(&config)?;

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// Files that exist but fail to load are skipped with a warning.
    pub fn discover_and_load(&self) -> FileConfig {
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        let mut merged_config = FileConfig::default();
        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => merged_config = self.merge_configs(merged_config, config),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                }
            }
        }

        merged_config
    }

    /// `./revwhoix.toml` or `./.revwhoix.toml`.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./revwhoix.toml", "./.revwhoix.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// `~/.revwhoix.toml`.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let path = Path::new(&env::var_os("HOME")?).join(".revwhoix.toml");
        path.exists().then_some(path)
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("revwhoix").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            search: match (lower.search, higher.search) {
                (Some(lower_search), Some(higher_search)) => Some(SearchSection {
                    endpoint: higher_search.endpoint.or(lower_search.endpoint),
                    timeout: higher_search.timeout.or(lower_search.timeout),
                    max_pages: higher_search.max_pages.or(lower_search.max_pages),
                    punycode: higher_search.punycode.or(lower_search.punycode),
                    search_type: higher_search.search_type.or(lower_search.search_type),
                }),
                (lower_search, higher_search) => higher_search.or(lower_search),
            },
            lookup: match (lower.lookup, higher.lookup) {
                (Some(lower_lookup), Some(higher_lookup)) => Some(LookupSection {
                    timeout: higher_lookup.timeout.or(lower_lookup.timeout),
                }),
                (lower_lookup, higher_lookup) => higher_lookup.or(lower_lookup),
            },
            credentials: match (lower.credentials, higher.credentials) {
                (Some(lower_creds), Some(higher_creds)) => Some(CredentialsSection {
                    path: higher_creds.path.or(lower_creds.path),
                }),
                (lower_creds, higher_creds) => higher_creds.or(lower_creds),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), RevWhoixError> {
        if let Some(search) = &config.search {
            if let Some(endpoint) = &search.endpoint {
                validate_endpoint(endpoint)?;
            }

            if let Some(timeout_str) = &search.timeout {
                parse_nonzero_timeout(timeout_str)?;
            }

            if let Some(max_pages) = search.max_pages {
                if max_pages == 0 || max_pages > MAX_PAGES_LIMIT {
                    return Err(RevWhoixError::config(format!(
                        "max_pages must be between 1 and {}",
                        MAX_PAGES_LIMIT
                    )));
                }
            }
        }

        if let Some(timeout_str) = config.lookup.as_ref().and_then(|l| l.timeout.as_ref()) {
            parse_nonzero_timeout(timeout_str)?;
        }

        if let Some(path) = config.credentials.as_ref().and_then(|c| c.path.as_ref()) {
            if path.as_os_str().is_empty() {
                return Err(RevWhoixError::config("Credential path cannot be empty"));
            }
        }

        Ok(())
    }
}

impl FileConfig {
    /// Apply the values this file sets on top of `config`.
    ///
    /// The file has already been validated, so unparsable values cannot occur
    /// here; they would be skipped.
    pub fn apply_to(self, mut config: SearchConfig) -> SearchConfig {
        if let Some(search) = self.search {
            if let Some(endpoint) = search.endpoint {
                config = config.with_endpoint(endpoint);
            }
            if let Some(timeout) = search.timeout.as_deref().and_then(parse_timeout_string) {
                config = config.with_timeout(Duration::from_secs(timeout));
            }
            if let Some(max_pages) = search.max_pages {
                config = config.with_max_pages(max_pages);
            }
            if let Some(punycode) = search.punycode {
                config.punycode = punycode;
            }
            if let Some(search_type) = search.search_type {
                config.search_type = search_type;
            }
        }

        if let Some(timeout) = self
            .lookup
            .and_then(|l| l.timeout)
            .as_deref()
            .and_then(parse_timeout_string)
        {
            config = config.with_lookup_timeout(Duration::from_secs(timeout));
        }

        if let Some(path) = self.credentials.and_then(|c| c.path) {
            config = config.with_credential_path(path);
        }

        config
    }
}

/// Environment variable configuration.
///
/// This represents configuration values that can be set via RW_* environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub endpoint: Option<String>,
    pub timeout: Option<Duration>,
    pub max_pages: Option<usize>,
    pub lookup_timeout: Option<Duration>,
    pub api_key_file: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl EnvConfig {
    /// Apply the values set in the environment on top of `config`.
    pub fn apply_to(&self, mut config: SearchConfig) -> SearchConfig {
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        if let Some(max_pages) = self.max_pages {
            config = config.with_max_pages(max_pages);
        }
        if let Some(timeout) = self.lookup_timeout {
            config = config.with_lookup_timeout(timeout);
        }
        if let Some(path) = &self.api_key_file {
            config = config.with_credential_path(path.clone());
        }
        config
    }
}

/// Load configuration from the process environment.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok())
}

/// Load RW_* configuration through an arbitrary variable lookup.
pub fn load_env_config_from<F>(var: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    // RW_ENDPOINT - API endpoint URL
    if let Some(endpoint) = var("RW_ENDPOINT") {
        match validate_endpoint(&endpoint) {
            Ok(()) => {
                tracing::debug!(endpoint = %endpoint, "using RW_ENDPOINT");
                env_config.endpoint = Some(endpoint.trim().to_string());
            }
            Err(e) => {
                tracing::warn!(value = %endpoint, error = %e, "invalid RW_ENDPOINT, ignoring");
            }
        }
    }

    // RW_TIMEOUT - HTTP request timeout
    if let Some(val) = var("RW_TIMEOUT") {
        match parse_nonzero_timeout(&val) {
            Ok(timeout) => env_config.timeout = Some(timeout),
            Err(_) => {
                tracing::warn!(
                    value = %val,
                    "invalid RW_TIMEOUT, use format like '5s', '30s', '2m'"
                );
            }
        }
    }

    // RW_MAX_PAGES - pagination bound
    if let Some(val) = var("RW_MAX_PAGES") {
        match val.trim().parse::<usize>() {
            Ok(max_pages) if max_pages > 0 && max_pages <= MAX_PAGES_LIMIT => {
                env_config.max_pages = Some(max_pages);
            }
            _ => {
                tracing::warn!(
                    value = %val,
                    "invalid RW_MAX_PAGES, must be 1-{}",
                    MAX_PAGES_LIMIT
                );
            }
        }
    }

    // RW_LOOKUP_TIMEOUT - reverse DNS and whois timeout
    if let Some(val) = var("RW_LOOKUP_TIMEOUT") {
        match parse_nonzero_timeout(&val) {
            Ok(timeout) => env_config.lookup_timeout = Some(timeout),
            Err(_) => {
                tracing::warn!(
                    value = %val,
                    "invalid RW_LOOKUP_TIMEOUT, use format like '5s', '30s', '2m'"
                );
            }
        }
    }

    // RW_API_KEY_FILE - credential file path
    if let Some(path) = var("RW_API_KEY_FILE") {
        if !path.trim().is_empty() {
            env_config.api_key_file = Some(PathBuf::from(path.trim()));
        }
    }

    // RW_CONFIG - explicit config file
    if let Some(path) = var("RW_CONFIG") {
        if !path.trim().is_empty() {
            env_config.config = Some(PathBuf::from(path.trim()));
        }
    }

    env_config
}

/// Parse a timeout string like "5s", "30s", "2m" into seconds.
///
/// # Arguments
///
/// * `timeout_str` - String representation of timeout
///
/// # Returns
///
/// Number of seconds, or None if parsing fails.
pub fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.parse::<u64>().ok()
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        // Assume seconds if no unit
        timeout_str.parse::<u64>().ok()
    }
}

fn parse_nonzero_timeout(timeout_str: &str) -> Result<Duration, RevWhoixError> {
    match parse_timeout_string(timeout_str) {
        Some(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(RevWhoixError::config(format!(
            "Invalid timeout '{}'. Use a non-zero value like '5s', '30s', '2m'",
            timeout_str
        ))),
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), RevWhoixError> {
    let endpoint = endpoint.trim();
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(())
    } else {
        Err(RevWhoixError::config(format!(
            "Endpoint '{}' must start with http:// or https://",
            endpoint
        )))
    }
}
