//! revwhoix CLI Application
//!
//! Finds every domain whose registration data mentions a keyword, using the
//! WhoisXML reverse WHOIS API, then offers a WHOIS lookup of one address or
//! domain typed at the prompt.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use revwhoix_lib::{
    default_credential_path, load_credential, load_env_config, random_user_agent,
    AuxiliaryResolver, ConfigManager, EnvConfig, FileConfig, RevWhoixError, ReverseWhoisSearcher,
    SearchConfig,
};
use std::io::BufRead;
use std::process;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for revwhoix
#[derive(Parser, Debug)]
#[command(name = "revwhoix")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "RevWhoix: A simple utility to perform reverse WHOIS lookups using WhoisXML API")]
#[command(
    long_about = "Perform reverse WHOIS lookups using the WhoisXML API.\n\nThe API key is read from ~/.config/whoisxml.conf (or RW_API_KEY_FILE). Matching domains are printed to stdout, one per line."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Keyword to search related domains (e.g., Org name, email address)
    #[arg(short = 'k', long = "keyword", value_name = "KEYWORD", required = true)]
    pub keyword: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    init_tracing();

    if let Err(e) = run(args).await {
        ui::print_error(&e.to_string());
        process::exit(1);
    }
}

/// Install the stderr log subscriber. RW_LOG wins over RUST_LOG.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("RW_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn run(args: Args) -> Result<(), RevWhoixError> {
    ui::print_banner();

    let config = build_config()?;

    let credential_path = config
        .credential_path
        .clone()
        .unwrap_or_else(default_credential_path);
    let api_key = load_credential(&credential_path).inspect_err(|_| {
        ui::print_hint(&format!(
            "Make sure a valid API key exists at {}",
            credential_path.display()
        ));
    })?;

    let keyword = args.keyword.trim();
    ui::print_status(&format!(
        "Performing reverse WHOIS lookup on \"{}\"",
        keyword
    ));

    let searcher = ReverseWhoisSearcher::new(api_key, config.clone())?;

    ui::print_status("Checking if domains exist");
    if searcher.probe(keyword).await? {
        ui::print_success("Domains exist");
        ui::print_status("Fetching domains");
        eprintln!();

        let mut output_closed = false;
        let domains = searcher
            .fetch_until(keyword, |domain| {
                let flow = ui::print_domain(domain);
                output_closed = flow.is_break();
                flow
            })
            .await?;

        // Nobody is reading results any more, so there is nothing to prompt for
        if output_closed {
            tracing::debug!(printed = domains.len(), "stdout closed, stopping");
            return Ok(());
        }

        eprintln!();
        ui::print_success(&format!(
            "{} domain{} found",
            domains.len(),
            if domains.len() == 1 { "" } else { "s" }
        ));
    } else {
        ui::print_status("No domains found");
    }

    let Some(input) = read_lookup_input() else {
        return Ok(());
    };

    let resolver = AuxiliaryResolver::new(&config);
    if let Some(record) = resolver.resolve(&input).await {
        ui::print_whois_record(&record);
    }

    Ok(())
}

/// Build the effective configuration.
///
/// Precedence, lowest to highest: defaults, config files (or the single
/// file named by RW_CONFIG), RW_* environment variables.
fn build_config() -> Result<SearchConfig, RevWhoixError> {
    let env_config = load_env_config();
    let config_manager = ConfigManager::new();

    let file_config = match &env_config.config {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using explicit config file (RW_CONFIG)");
            config_manager.load_file(path)?
        }
        None => config_manager.discover_and_load(),
    };

    Ok(merge_config(file_config, &env_config))
}

fn merge_config(file_config: FileConfig, env_config: &EnvConfig) -> SearchConfig {
    let config = env_config.apply_to(file_config.apply_to(SearchConfig::default()));
    config.with_user_agent(random_user_agent())
}

/// Prompt for the auxiliary lookup target and read one line.
///
/// `None` on EOF, read error or blank input.
fn read_lookup_input() -> Option<String> {
    ui::print_prompt();

    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) => {
            eprintln!();
            None
        }
        Ok(_) => non_blank(&line),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read lookup input");
            None
        }
    }
}

fn non_blank(line: &str) -> Option<String> {
    let line = line.trim();
    (!line.is_empty()).then(|| line.to_string())
}
