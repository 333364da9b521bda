//! Error types for bwilcd
//!
//! This module defines the error types for every component of the client.
//! Errors are designed to be actionable: each one renders as a single line
//! that the REPL can show to the user before continuing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while talking to an ILCD Network node
#[derive(Error, Debug)]
pub enum ApiError {
    /// Node unreachable, request timed out, or the stream broke mid-transfer
    #[error("Could not reach {url}: {reason}")]
    Connection { url: String, reason: String },

    /// Credentials missing or rejected (HTTP 401/403)
    #[error("Access denied by node (HTTP {status}). Check your credentials")]
    Auth { status: u16 },

    /// Stock or dataset no longer exists (HTTP 404)
    #[error("Not found on node: {url}")]
    NotFound { url: String },

    /// Response body could not be understood
    #[error("Malformed response from node: {reason}")]
    Protocol { reason: String },

    /// Any other non-success status
    #[error("Server error: HTTP {status}")]
    Server { status: u16 },

    /// Node URL could not be parsed or extended
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// reqwest client could not be built from the configuration
    #[error("Could not set up the HTTP client: {reason}")]
    ClientSetup { reason: String },

    /// Destination already exists and overwriting is disabled
    #[error("File already exists: {path}. Enable download.overwrite to replace it")]
    FileExists { path: PathBuf },

    /// Local I/O error while writing a download
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Build a protocol error from anything printable
    pub fn protocol(reason: impl Into<String>) -> Self {
        Self::Protocol {
            reason: reason.into(),
        }
    }

    /// Map a non-success HTTP status to the matching error
    pub fn from_status(status: u16, url: &str) -> Self {
        match status {
            401 | 403 => Self::Auth { status },
            404 => Self::NotFound {
                url: url.to_string(),
            },
            status => Self::Server { status },
        }
    }

    /// Map a transport-level reqwest failure
    pub fn from_transport(error: reqwest::Error, url: &str) -> Self {
        if error.is_builder() {
            return Self::InvalidUrl {
                url: url.to_string(),
                error: error.to_string(),
            };
        }
        if let Some(status) = error.status() {
            return Self::from_status(status.as_u16(), url);
        }
        let reason = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            "connection failed".to_string()
        } else {
            error.to_string()
        };
        Self::Connection {
            url: url.to_string(),
            reason,
        }
    }
}

/// Errors caused by what the user typed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserInputError {
    /// Verb is not a known command or alias
    #[error("Unknown command '{verb}'. Type 'help' for the available commands")]
    UnknownCommand { verb: String },

    /// Command exists but is not valid in the current state
    #[error("'{command}' is not available while {state}")]
    NotAllowed {
        command: &'static str,
        state: &'static str,
    },

    /// Command needs an argument that was not given
    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    /// Argument should have been a positive number
    #[error("'{value}' is not a valid number")]
    InvalidNumber { value: String },

    /// Number outside the listing currently shown
    #[error("No {kind} #{index}. Choose between {min} and {max}")]
    OutOfRange {
        kind: &'static str,
        index: usize,
        min: usize,
        max: usize,
    },

    /// No registry node carries this label
    #[error("No node named '{label}'. Type 'help' to list the known nodes")]
    UnknownNode { label: String },

    /// Listing is empty so nothing can be chosen
    #[error("There are no {kind}s to choose from")]
    NothingToChoose { kind: &'static str },

    /// Ad-hoc node URL is unusable
    #[error("Invalid node URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Credential input rejected
    #[error("Invalid credentials: {reason}")]
    InvalidCredentials { reason: String },
}

/// Configuration and node registry errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Node registry could not be parsed
    #[error("Invalid node registry: {0}")]
    InvalidRegistry(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Config directory unavailable on this platform
    #[error("Could not determine user config directory")]
    NoConfigDir,
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Node communication error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// User input error
    #[error(transparent)]
    Input(#[from] UserInputError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Terminal or other I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether the REPL can report the error and keep going
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Api(_) | AppError::Input(_) => true,
            AppError::Config(_) | AppError::Io(_) => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Api(ApiError::Connection { .. }) => "connection",
            AppError::Api(ApiError::Auth { .. }) => "authentication",
            AppError::Api(ApiError::NotFound { .. }) => "not_found",
            AppError::Api(ApiError::Protocol { .. }) => "protocol",
            AppError::Api(_) => "api",
            AppError::Input(_) => "input",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Node communication result type alias
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Input validation result type alias
pub type InputResult<T> = std::result::Result<T, UserInputError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ApiError::from_status(401, "u"),
            ApiError::Auth { status: 401 }
        ));
        assert!(matches!(
            ApiError::from_status(403, "u"),
            ApiError::Auth { status: 403 }
        ));
        assert!(matches!(
            ApiError::from_status(404, "u"),
            ApiError::NotFound { .. }
        ));
        assert!(matches!(
            ApiError::from_status(500, "u"),
            ApiError::Server { status: 500 }
        ));
    }

    #[test]
    fn test_categories() {
        let err = AppError::from(ApiError::Connection {
            url: "https://x".into(),
            reason: "connection failed".into(),
        });
        assert_eq!(err.category(), "connection");
        assert!(err.is_recoverable());

        let err = AppError::from(UserInputError::UnknownCommand { verb: "zap".into() });
        assert_eq!(err.category(), "input");
        assert!(err.is_recoverable());

        let err = AppError::from(ConfigError::NoConfigDir);
        assert!(!err.is_recoverable());

        let err = AppError::from(std::io::Error::other("stdout closed"));
        assert_eq!(err.category(), "io");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_messages_are_single_line() {
        let errors: Vec<AppError> = vec![
            ApiError::Auth { status: 401 }.into(),
            ApiError::protocol("unexpected end of document").into(),
            UserInputError::NotAllowed {
                command: "search",
                state: "disconnected",
            }
            .into(),
            UserInputError::OutOfRange {
                kind: "stock",
                index: 9,
                min: 1,
                max: 3,
            }
            .into(),
        ];
        for err in errors {
            assert!(!err.to_string().contains('\n'), "{}", err);
        }
    }
}
