//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! shared by every request to a node. The client keeps no cookie jar;
//! credentials travel with each request.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::http;
use crate::errors::{ApiError, ApiResult};

/// Configuration for the node HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Timeout for listing and detail requests (downloads are not bounded)
    pub request_timeout: Duration,
    /// Connect timeout, applied to downloads as well
    pub connect_timeout: Duration,
    /// Skip TLS certificate verification (some nodes use self-signed certificates)
    pub accept_invalid_certs: bool,
    /// User agent sent with every request
    pub user_agent: String,
    /// Replace an existing archive when downloading a stock again
    pub overwrite_downloads: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            accept_invalid_certs: false,
            user_agent: http::USER_AGENT.to_string(),
            overwrite_downloads: true,
        }
    }
}

impl ClientConfig {
    /// Builds the reqwest client from these settings
    pub fn build_http_client(&self) -> ApiResult<Client> {
        let mut client_builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.clone());

        if self.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        client_builder.build().map_err(|e| ApiError::ClientSetup {
            reason: e.to_string(),
        })
    }
}
