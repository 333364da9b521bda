//! Command-line argument parsing for bwilcd
//!
//! The binary takes no subcommands: it starts the interactive browser. Flags
//! only override configuration and logging.

use std::path::PathBuf;

use clap::Parser;

/// bwilcd - browse ILCD Network nodes from the terminal
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "bwilcd",
    version,
    about = "Interactive browser for ILCD Network (soda4LCA) nodes",
    long_about = "Connect to ILCD Network nodes, list their data stocks, browse and search
process datasets, inspect dataset details and download whole stocks as ZIP archives."
)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Node registry (JSON) replacing the bundled node list
    #[arg(long, value_name = "FILE")]
    pub nodes: Option<PathBuf>,

    /// Directory downloaded archives are written to
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long)]
    pub very_verbose: bool,

    /// Quiet mode - only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on the flags
    ///
    /// Returns `None` when no flag was given so the configured level applies.
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.quiet {
            Some(tracing::Level::ERROR)
        } else if self.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        let cli_quiet = Cli {
            quiet: true,
            verbose: true,
            ..Default::default()
        };
        let cli_verbose = Cli {
            verbose: true,
            ..Default::default()
        };
        let cli_debug = Cli {
            very_verbose: true,
            ..Default::default()
        };

        assert_eq!(cli_quiet.log_level(), Some(tracing::Level::ERROR));
        assert_eq!(cli_verbose.log_level(), Some(tracing::Level::INFO));
        assert_eq!(cli_debug.log_level(), Some(tracing::Level::DEBUG));
        assert_eq!(Cli::default().log_level(), None);
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "bwilcd",
            "--nodes",
            "my-nodes.json",
            "--download-dir",
            "/tmp/lca",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.nodes, Some(PathBuf::from("my-nodes.json")));
        assert_eq!(cli.download_dir, Some(PathBuf::from("/tmp/lca")));
        assert!(cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_rejects_positional_arguments() {
        assert!(Cli::try_parse_from(["bwilcd", "connect"]).is_err());
    }
}
