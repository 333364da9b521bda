//! Command-line interface components
//!
//! This module contains the interactive side of bwilcd: argument parsing,
//! command parsing, rendering, download progress and the REPL itself.

pub mod args;
pub mod command;
pub mod progress;
pub mod render;
pub mod repl;

pub use args::Cli;
pub use command::{Command, CommandHelp, COMMANDS};
pub use progress::DownloadProgress;
pub use repl::{Flow, Repl};
