//! Error handling for reverse WHOIS operations.
//!
//! This module defines one error type covering every way a run can fail,
//! from a missing API key to a WHOIS server that has never heard of a domain.

use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Main error type for revwhoix operations.
///
/// Credential, network and pagination failures abort the keyword search.
/// `ResolutionError` belongs to the auxiliary lookup and is never fatal.
#[derive(Debug, Clone)]
pub enum RevWhoixError {
    /// API key file missing, unreadable or too short
    CredentialError { path: String, message: String },

    /// Transport-level failure (connection refused, TLS, DNS, etc.)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// The API answered with something other than 200 OK
    HttpStatus { status: u16, message: String },

    /// An operation took longer than its configured timeout
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// The API answered 200 but the body was not a search response
    ParseError { message: String },

    /// Pagination did not terminate within the configured bounds
    PaginationError { pages: usize, message: String },

    /// Reverse DNS or WHOIS lookup failure during the auxiliary phase
    ResolutionError { target: String, message: String },

    /// Invalid configuration file or value
    ConfigError { message: String },
}

impl RevWhoixError {
    /// Create a new credential error for the given key file.
    pub fn credential<P: AsRef<Path>, M: Into<String>>(path: P, message: M) -> Self {
        Self::CredentialError {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new HTTP status error.
    pub fn http_status<M: Into<String>>(status: u16, message: M) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new parse error.
    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Create a new pagination error.
    pub fn pagination<M: Into<String>>(pages: usize, message: M) -> Self {
        Self::PaginationError {
            pages,
            message: message.into(),
        }
    }

    /// Create a new resolution error.
    pub fn resolution<T: Into<String>, M: Into<String>>(target: T, message: M) -> Self {
        Self::ResolutionError {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Check if this error suggests the operation could succeed on a retry.
    ///
    /// Transport failures, timeouts, rate limiting and server-side errors are
    /// transient. Client errors (bad key, bad request) and malformed bodies are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. }
                | Self::Timeout { .. }
                | Self::HttpStatus {
                    status: 429 | 500..=599,
                    ..
                }
        )
    }

    /// Whether this error should end the program.
    ///
    /// Only auxiliary lookups are allowed to fail quietly.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ResolutionError { .. })
    }
}

impl fmt::Display for RevWhoixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CredentialError { path, message } => {
                write!(f, "Credential error at '{}': {}", path, message)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::HttpStatus { status, message } => {
                write!(f, "HTTP {} from reverse WHOIS API: {}", status, message)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::ParseError { message } => write!(f, "Parse error: {}", message),
            Self::PaginationError { pages, message } => {
                write!(f, "Pagination stopped after {} pages: {}", pages, message)
            }
            Self::ResolutionError { target, message } => {
                write!(f, "Lookup failed for '{}': {}", target, message)
            }
            Self::ConfigError { message } => write!(f, "Configuration error: {}", message),
        }
    }
}

impl std::error::Error for RevWhoixError {}

/// Timeouts are not mapped here: only the caller knows the deadline it set.
impl From<reqwest::Error> for RevWhoixError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else if let Some(status) = err.status() {
            Self::http_status(status.as_u16(), err.to_string())
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<serde_json::Error> for RevWhoixError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(format!("JSON parsing failed: {}", err))
    }
}
