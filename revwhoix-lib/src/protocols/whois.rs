//! WHOIS lookups for the auxiliary phase.
//!
//! This module queries WHOIS through the system's `whois` command and turns
//! the free-form text answer into a field/value record. Parsing is best effort:
//! WHOIS output differs between registries, so every `key: value` line is kept.

use crate::error::RevWhoixError;
use crate::types::WhoisRecord;
use std::time::Duration;
use tokio::process::Command;

/// Phrases registries use when they have no record for a domain.
const NOT_FOUND_PATTERNS: &[&str] = &[
    "no match",
    "not found",
    "no data found",
    "no entries found",
    "domain not found",
    "no matching record",
    "the queried object does not exist",
    "object does not exist",
    "no matching entry",
    "domain name not found",
    "this domain name has not been registered",
    "not registered",
];

/// Phrases indicating the WHOIS server throttled us.
const RATE_LIMIT_PATTERNS: &[&str] = &[
    "rate limit exceeded",
    "too many requests",
    "try again later",
    "quota exceeded",
    "limit exceeded",
    "throttled",
    "rate-limited",
];

/// Field names longer than this are legal boilerplate, not data.
const MAX_FIELD_NAME_LEN: usize = 40;

/// Something that can fetch the WHOIS record of a domain.
#[allow(async_fn_in_trait)]
pub trait WhoisLookup {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, RevWhoixError>;
}

/// WHOIS client backed by the system's `whois` command.
#[derive(Clone)]
pub struct WhoisClient {
    /// Timeout for one `whois` invocation
    timeout: Duration,
}

impl WhoisClient {
    /// Create a new WHOIS client with default settings.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }

    /// Create a new WHOIS client with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `whois <domain>`, retrying once after a short pause if the server
    /// says we are rate limited.
    async fn execute_whois_command(&self, domain: &str) -> Result<String, RevWhoixError> {
        let output = self.run_once(domain).await?;

        if is_rate_limited(&output) {
            tracing::debug!(domain, "WHOIS server rate limited us, retrying once");
            tokio::time::sleep(Duration::from_millis(1000)).await;
            return self.run_once(domain).await;
        }

        Ok(output)
    }

    async fn run_once(&self, domain: &str) -> Result<String, RevWhoixError> {
        let mut command = whois_command(domain);
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                RevWhoixError::resolution(
                    domain,
                    format!("WHOIS query timed out after {:?}", self.timeout),
                )
            })?
            .map_err(|e| {
                RevWhoixError::resolution(
                    domain,
                    format!(
                        "Failed to execute whois command: {}. Make sure 'whois' is installed.",
                        e
                    ),
                )
            })?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// `whois -- <domain>`; the `--` keeps a leading `-` from reading as an option.
fn whois_command(domain: &str) -> Command {
    let mut command = Command::new("whois");
    command.arg("--").arg(domain).kill_on_drop(true);
    command
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WhoisLookup for WhoisClient {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, RevWhoixError> {
        let raw = self.execute_whois_command(domain).await?;
        record_from_output(domain, &raw)
    }
}

/// Turn raw `whois` output into a record, or explain why there is none.
pub fn record_from_output(domain: &str, raw: &str) -> Result<WhoisRecord, RevWhoixError> {
    let record = parse_whois_output(domain, raw);

    // A registry answer always names the domain or its registrar; if neither
    // is present, a "no match" banner is taken at its word.
    let has_registration = record.get("domain_name").is_some() || record.get("registrar").is_some();
    if !has_registration && indicates_not_found(raw) {
        return Err(RevWhoixError::resolution(domain, "no WHOIS record found"));
    }

    if record.is_empty() {
        return Err(RevWhoixError::resolution(
            domain,
            "WHOIS response contained no fields",
        ));
    }

    Ok(record)
}

/// Parse `key: value` lines from WHOIS output.
///
/// Comment and banner lines are skipped, field names are normalized to
/// lower snake_case, and repeated fields are merged.
pub fn parse_whois_output(domain: &str, raw: &str) -> WhoisRecord {
    let mut record = WhoisRecord::new(domain);

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with('%')
            || line.starts_with('#')
            || line.starts_with(">>>")
        {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let value = value.trim();
        let key = key.trim();
        if value.is_empty() || key.is_empty() || key.len() > MAX_FIELD_NAME_LEN {
            continue;
        }

        let name = normalize_field_name(key);
        if !name.is_empty() {
            record.insert(&name, value);
        }
    }

    record
}

/// "Registry Expiry Date" -> "registry_expiry_date"
fn normalize_field_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    for c in key.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
        } else if !name.ends_with('_') {
            name.push('_');
        }
    }
    name.trim_matches('_').to_string()
}

fn indicates_not_found(output: &str) -> bool {
    let output_lower = output.to_lowercase();
    NOT_FOUND_PATTERNS
        .iter()
        .any(|pattern| output_lower.contains(pattern))
}

fn is_rate_limited(output: &str) -> bool {
    let output_lower = output.to_lowercase();
    RATE_LIMIT_PATTERNS
        .iter()
        .any(|pattern| output_lower.contains(pattern))
}
