//! Application constants for bwilcd
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("bwilcd/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Accept header for Service API documents
    pub const ACCEPT_XML: &str = "application/xml";

    /// Accept header for stock exports
    pub const ACCEPT_ZIP: &str = "application/zip";
}

/// soda4LCA Service API paths and parameters
pub mod api {
    /// Path segment every node exposes its Service API under
    pub const RESOURCE_SEGMENT: &str = "resource";

    /// Data stock collection
    pub const DATASTOCKS: &str = "datastocks";

    /// Process collection, both per stock and global
    pub const PROCESSES: &str = "processes";

    /// Stock export endpoint
    pub const EXPORT: &str = "export";

    /// Process exchange listing
    pub const EXCHANGES: &str = "exchanges";

    /// Listing offset parameter
    pub const PARAM_START_INDEX: &str = "startIndex";

    /// Listing page size parameter
    pub const PARAM_PAGE_SIZE: &str = "pageSize";

    /// Search switch parameter
    pub const PARAM_SEARCH: &str = "search";

    /// Search text parameter
    pub const PARAM_NAME: &str = "name";

    /// Default number of datasets per page
    pub const DEFAULT_PAGE_SIZE: usize = 20;
}

/// Node registry constants
pub mod nodes {
    /// Registry bundled into the binary
    pub const BUNDLED_REGISTRY: &str = include_str!("../assets/nodes.json");

    /// Label of the node used when the registry is empty
    pub const FALLBACK_LABEL: &str = "ProBas";

    /// URL of the node used when the registry is empty
    pub const FALLBACK_URL: &str = "https://data.probas.umweltbundesamt.de";
}

/// File operation constants
pub mod files {
    /// Suffix appended to a download while it is in flight
    pub const PARTIAL_SUFFIX: &str = ".part";

    /// Extension of downloaded stock archives
    pub const ARCHIVE_EXTENSION: &str = "zip";

    /// Configuration file looked up in the working directory
    pub const LOCAL_CONFIG_FILE: &str = "bwilcd.toml";

    /// Application directory name under the user config directory
    pub const APP_DIR: &str = "bwilcd";
}

/// Progress reporting
pub mod progress {
    /// Maximum progress bar redraws per second
    pub const REFRESH_HZ: u8 = 10;
}

/// Rendering constants
pub mod render {
    /// Prompt shown before each command
    pub const PROMPT: &str = "bwilcd> ";

    /// Longest free-text section shown in dataset detail
    pub const MAX_TEXT_SECTION: usize = 500;

    /// Width of section underlines
    pub const RULE_WIDTH: usize = 40;
}

// Re-export commonly used constants for convenience
pub use api::DEFAULT_PAGE_SIZE;
pub use http::USER_AGENT;
