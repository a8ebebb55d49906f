//! API key loading.
//!
//! The WhoisXML API key lives in a plain text file under the user's home
//! directory. The whole trimmed file content is the key.

use crate::error::RevWhoixError;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Keys shorter than this are treated as missing.
const MIN_KEY_LEN: usize = 2;

/// A WhoisXML API key.
///
/// `Debug` never prints the key itself.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<{} chars>)", self.0.len())
    }
}

/// Default location of the API key: `$HOME/.config/whoisxml.conf`.
///
/// Falls back to a relative path when `HOME` is unset.
pub fn default_credential_path() -> PathBuf {
    env::var_os("HOME")
        .map(|home| Path::new(&home).join(".config").join("whoisxml.conf"))
        .unwrap_or_else(|| PathBuf::from(".config/whoisxml.conf"))
}

/// Read the API key from `path`.
///
/// # Errors
///
/// Returns `RevWhoixError::CredentialError` if the file is missing or unreadable,
/// or if its trimmed content is shorter than two characters.
pub fn load_credential<P: AsRef<Path>>(path: P) -> Result<ApiKey, RevWhoixError> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        let message = if e.kind() == std::io::ErrorKind::NotFound {
            "API key file not found".to_string()
        } else {
            format!("Failed to read API key file: {}", e)
        };
        RevWhoixError::credential(path, message)
    })?;

    let key = content.trim();
    if key.chars().count() < MIN_KEY_LEN {
        return Err(RevWhoixError::credential(
            path,
            "API key is missing or too short",
        ));
    }

    tracing::debug!(path = %path.display(), "loaded API key");
    Ok(ApiKey(key.to_string()))
}
