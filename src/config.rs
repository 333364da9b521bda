//! Configuration management for bwilcd
//!
//! Settings come from an optional TOML file, searched in this order:
//! 1. `--config <FILE>` (must exist)
//! 2. `./bwilcd.toml`
//! 3. `<user config dir>/bwilcd/config.toml`
//!
//! Missing sections and keys fall back to defaults, so an empty file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, NodeRegistry, SessionConfig};
use crate::constants::{api, files, http};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Listing settings
    pub browse: BrowseConfigToml,
    /// Archive download settings
    pub download: DownloadConfigToml,
    /// Node registry settings
    pub nodes: NodesConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Accept self-signed or otherwise invalid TLS certificates
    pub accept_invalid_certs: bool,
    /// Override the User-Agent header
    pub user_agent: Option<String>,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            accept_invalid_certs: false,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrowseConfigToml {
    /// Datasets per page
    pub page_size: usize,
}

impl Default for BrowseConfigToml {
    fn default() -> Self {
        Self {
            page_size: api::DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DownloadConfigToml {
    /// Directory archives are written to
    pub directory: PathBuf,
    /// Replace an archive that already exists
    pub overwrite: bool,
}

impl Default for DownloadConfigToml {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            overwrite: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct NodesConfigToml {
    /// JSON registry replacing the bundled node list
    pub registry_file: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parse the configured level
    pub fn tracing_level(&self) -> ConfigResult<tracing::Level> {
        self.level
            .parse::<tracing::Level>()
            .map_err(|_| ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: self.level.clone(),
                reason: "expected one of error, warn, info, debug, trace".to_string(),
            })
    }
}

impl AppConfig {
    /// Load configuration, falling back to defaults when no file is found
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an explicitly named file does not exist, a
    /// file cannot be read or parsed, or a value is out of range
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        let config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(".").join(files::LOCAL_CONFIG_FILE)];
        match Self::get_default_config_path() {
            Ok(path) => search_paths.push(path),
            Err(e) => debug!("Skipping user config: {}", e),
        }

        let found = search_paths.into_iter().find(|path| path.exists());
        match &found {
            Some(path) => debug!("Found config file: {}", path.display()),
            None => debug!("No config file found in standard locations"),
        }
        found
    }

    /// Get the default config file path for the current user
    pub fn get_default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(files::APP_DIR).join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Reject values the rest of the program cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.browse.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "browse.page_size".to_string(),
                value: "0".to_string(),
                reason: "page size must be at least 1".to_string(),
            });
        }
        if self.client.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "timeout must be at least 1 second".to_string(),
            });
        }
        self.logging.tracing_level()?;
        Ok(())
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, nodes: Option<PathBuf>, download_dir: Option<PathBuf>) -> Self {
        if let Some(nodes) = nodes {
            self.nodes.registry_file = Some(nodes);
        }
        if let Some(download_dir) = download_dir {
            self.download.directory = download_dir;
        }
        self
    }

    /// Runtime client configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: Duration::from_secs(self.client.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.client.connect_timeout_secs),
            accept_invalid_certs: self.client.accept_invalid_certs,
            user_agent: self
                .client
                .user_agent
                .clone()
                .unwrap_or_else(|| http::USER_AGENT.to_string()),
            overwrite_downloads: self.download.overwrite,
        }
    }

    /// Runtime session configuration
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            page_size: self.browse.page_size,
            download_dir: self.download.directory.clone(),
        }
    }

    /// Node registry from the configured file, or the bundled one
    pub fn node_registry(&self) -> ConfigResult<NodeRegistry> {
        match &self.nodes.registry_file {
            Some(path) => NodeRegistry::from_file(path),
            None => NodeRegistry::bundled(),
        }
    }
}
