//! bwilcd CLI application
//!
//! Interactive browser for ILCD Network nodes. Loads configuration and the
//! node registry, then hands stdin and stdout to the REPL.

use std::io::IsTerminal;
use std::process;

use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use bwilcd::app::{Session, SodaClient};
use bwilcd::auth::TerminalSecretPrompt;
use bwilcd::cli::{Cli, Repl};
use bwilcd::config::AppConfig;
use bwilcd::errors::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config = AppConfig::load(cli.config.clone())
        .await?
        .with_overrides(cli.nodes.clone(), cli.download_dir.clone());

    init_logging(&cli, &config)?;
    info!("bwilcd v{} starting", env!("CARGO_PKG_VERSION"));

    let registry = config.node_registry()?;
    let client = SodaClient::with_config(config.client_config())?;
    let session = Session::new(client, registry, config.session_config());

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = std::io::stdout();
    let mut repl = Repl::new(session, stdin, stdout, TerminalSecretPrompt)
        .with_progress(!cli.quiet && std::io::stderr().is_terminal());

    repl.run().await
}

/// Initialize logging from the verbosity flags, falling back to the config
fn init_logging(cli: &Cli, config: &AppConfig) -> Result<()> {
    let log_level = match cli.log_level() {
        Some(level) => level,
        None => config.logging.tracing_level()?,
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("bwilcd={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(cli.very_verbose)
        .init();

    if cli.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.verbose {
        info!("Verbose logging enabled");
    }
    Ok(())
}
