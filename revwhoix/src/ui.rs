//! Console output for the revwhoix CLI.
//!
//! Domains and WHOIS fields go to stdout so they can be piped. The banner,
//! status lines, errors and the prompt go to stderr. Uses only the `console`
//! crate.

use console::{style, Term};
use revwhoix_lib::WhoisRecord;
use std::io::{self, Write};
use std::ops::ControlFlow;

const BANNER: &str = r"
                            __          _
   ________ _   ___      __/ /_  ____  (_)  __
  / ___/ _ \ | / / | /| / / __ \/ __ \/ / |/_/
 / /  /  __/ |/ /| |/ |/ / / / / /_/ / />  <
/_/   \___/|___/ |__/|__/_/ /_/\____/_/_/|_|
";

// ── Banner ───────────────────────────────────────────────────────────────────

pub fn print_banner() {
    eprintln!("{}", style(BANNER).yellow().bold());
    eprintln!(
        "{} {}",
        style("revwhoix").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
    );
    eprintln!();
}

// ── Status lines ─────────────────────────────────────────────────────────────

/// Progress message, e.g. "Checking if domains exist".
pub fn print_status(message: &str) {
    eprintln!("{} {}", style("•").cyan().bold(), message);
}

pub fn print_success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

pub fn print_hint(message: &str) {
    eprintln!("  {}", style(message).dim());
}

// ── Results ──────────────────────────────────────────────────────────────────

/// One matching domain, on stdout.
///
/// Returns `Break` once stdout can no longer be written, e.g. when the
/// reading end of a pipe has gone away.
pub fn print_domain(domain: &str) -> ControlFlow<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match writeln!(out, "{}", domain) {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => ControlFlow::Break(()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to write to stdout");
            ControlFlow::Break(())
        }
    }
}

/// The record returned by the auxiliary lookup, one `field: value` per line.
pub fn print_whois_record(record: &WhoisRecord) {
    eprintln!();
    eprintln!(
        "{} {}",
        style("WHOIS Information:").bold(),
        style(&record.domain).dim()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for field in record.fields() {
        // A closed pipe is not worth failing over at this point
        let _ = writeln!(out, "{}", field);
    }
}

// ── Prompt ───────────────────────────────────────────────────────────────────

/// Ask for the auxiliary lookup target on stderr.
pub fn print_prompt() {
    let term = Term::stderr();
    let _ = term.write_str(&format!(
        "{} ",
        style("Enter the DNS record (IP address or domain name):").bold()
    ));
    let _ = term.flush();
}
