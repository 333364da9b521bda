//! Authentication support for ILCD Network nodes
//!
//! Nodes that restrict access accept HTTP basic authentication. This module
//! holds the credential type and the password prompt used by the REPL.
//!
//! # Examples
//!
//! ```rust
//! use bwilcd::auth::Credentials;
//!
//! let creds = Credentials::new("alice", "s3cret").unwrap();
//! assert_eq!(creds.username(), "alice");
//! assert!(!format!("{:?}", creds).contains("s3cret"));
//! ```

pub mod credentials;

// Re-export main public API
pub use credentials::{Credentials, SecretPrompt, TerminalSecretPrompt};
