//! Core HTTP operations against a node
//!
//! Every request is a GET with an explicit `Accept` header and, when the
//! connection carries credentials, a basic-auth header. Failures are mapped
//! straight to [`ApiError`]; nothing is retried.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use url::Url;

use crate::auth::Credentials;
use crate::constants::http;
use crate::errors::{ApiError, ApiResult};

/// HTTP operations handler
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: Client,
    request_timeout: Duration,
}

impl HttpHandler {
    /// Creates a new HttpHandler around a configured client
    pub fn new(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    /// Sends a GET request and checks the status
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `accept` - Media type to request
    /// * `credentials` - Basic-auth credentials, if the connection has any
    /// * `timeout` - Whole-request timeout; `None` leaves only the connect timeout
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Connection` when the node cannot be reached and the
    /// status-specific variant for any non-success response
    pub async fn send(
        &self,
        url: &Url,
        accept: &str,
        credentials: Option<&Credentials>,
        timeout: Option<Duration>,
    ) -> ApiResult<Response> {
        let mut request = self.client.get(url.clone()).header(ACCEPT, accept);
        if let Some(credentials) = credentials {
            request = request.basic_auth(credentials.username(), Some(credentials.password()));
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("Request to {} failed: {}", url, e);
            ApiError::from_transport(e, url.as_str())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Node answered {} for {}", status, url);
            return Err(ApiError::from_status(status.as_u16(), url.as_str()));
        }

        tracing::debug!("Fetched response: {}", url);
        Ok(response)
    }

    /// Fetches a Service API XML document
    pub async fn get_document(
        &self,
        url: &Url,
        credentials: Option<&Credentials>,
    ) -> ApiResult<Vec<u8>> {
        let response = self
            .send(url, http::ACCEPT_XML, credentials, Some(self.request_timeout))
            .await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_transport(e, url.as_str()))?;
        tracing::debug!("Received {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::client::config::ClientConfig;

    #[tokio::test]
    async fn test_unreachable_node_is_connection_error() {
        let config = ClientConfig {
            connect_timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let handler = HttpHandler::new(config.build_http_client().unwrap(), Duration::from_secs(2));

        // Port 9 on localhost is almost never served
        let url = Url::parse("http://127.0.0.1:9/resource/datastocks").unwrap();
        let result = handler.get_document(&url, None).await;

        assert!(matches!(result, Err(ApiError::Connection { .. })));
    }
}
