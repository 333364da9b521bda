//! HTTP client for the soda4LCA Service API
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: GET requests with status mapping and basic auth
//! - `download`: streaming archive downloads with atomic writes
//!
//! The session reaches the node only through the [`CatalogApi`] trait, so it
//! can be driven by a stub in tests.

use std::path::Path;

use url::Url;

use crate::app::models::{
    Connection, Dataset, DatasetDetail, DatasetPage, Node, PageRequest, Stock,
};
use crate::app::xml;
use crate::constants::api;
use crate::errors::{ApiError, ApiResult};

// Module declarations
pub mod config;
pub mod download;
pub mod http;

pub use config::ClientConfig;

use download::DownloadHandler;
use http::HttpHandler;

/// Catalog operations offered by an ILCD Network node
#[allow(async_fn_in_trait)]
pub trait CatalogApi {
    /// Lists the data stocks visible to this connection
    async fn list_stocks(&self, connection: &Connection) -> ApiResult<Vec<Stock>>;

    /// Fetches one page of the datasets in a stock
    async fn list_datasets(
        &self,
        connection: &Connection,
        stock: &Stock,
        page: PageRequest,
    ) -> ApiResult<DatasetPage>;

    /// Fetches one page of datasets whose name matches `query`
    async fn search_datasets(
        &self,
        connection: &Connection,
        stock: &Stock,
        query: &str,
        page: PageRequest,
    ) -> ApiResult<DatasetPage>;

    /// Fetches the overview of a single process with its exchanges
    async fn dataset_detail(
        &self,
        connection: &Connection,
        dataset: &Dataset,
    ) -> ApiResult<DatasetDetail>;

    /// Streams the export archive of a stock to `destination`
    ///
    /// Returns the number of bytes written. No file is left behind on failure.
    async fn download_stock(
        &self,
        connection: &Connection,
        stock: &Stock,
        destination: &Path,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> ApiResult<u64>;
}

/// Client for soda4LCA nodes
#[derive(Debug)]
pub struct SodaClient {
    http_handler: HttpHandler,
    config: ClientConfig,
}

impl SodaClient {
    /// Creates a client with default settings
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the HTTP client cannot be built
    pub fn new() -> ApiResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with custom configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        let client = config.build_http_client()?;
        tracing::debug!(
            "Created HTTP client (timeout {:?}, connect timeout {:?})",
            config.request_timeout,
            config.connect_timeout
        );
        Ok(Self {
            http_handler: HttpHandler::new(client, config.request_timeout),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn fetch(&self, connection: &Connection, url: &Url) -> ApiResult<Vec<u8>> {
        self.http_handler
            .get_document(url, connection.credentials.as_ref())
            .await
    }
}

/// Resource URL of `node` extended by `segments`
pub fn endpoint(node: &Node, segments: &[&str]) -> ApiResult<Url> {
    let mut url = node.resource_url()?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl {
            url: node.base_url.clone(),
            error: "URL cannot be used as a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Listing URL for a page of a stock, optionally filtered by name
pub fn dataset_listing_url(
    node: &Node,
    stock: &Stock,
    query: Option<&str>,
    page: PageRequest,
) -> ApiResult<Url> {
    let mut url = endpoint(node, &[api::DATASTOCKS, &stock.id, api::PROCESSES])?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair(api::PARAM_START_INDEX, &page.start_index().to_string())
            .append_pair(api::PARAM_PAGE_SIZE, &page.size.to_string());
        if let Some(query) = query {
            pairs
                .append_pair(api::PARAM_SEARCH, "true")
                .append_pair(api::PARAM_NAME, query);
        }
    }
    Ok(url)
}

fn with_overview(mut url: Url) -> Url {
    url.query_pairs_mut()
        .append_pair("format", "xml")
        .append_pair("view", "overview");
    url
}

impl CatalogApi for SodaClient {
    async fn list_stocks(&self, connection: &Connection) -> ApiResult<Vec<Stock>> {
        let url = endpoint(&connection.node, &[api::DATASTOCKS])?;
        tracing::info!("Fetching stocks from {}", connection.node.label);
        let body = self.fetch(connection, &url).await?;
        let stocks = xml::parse_stocks(&body)?;
        tracing::info!("Node {} lists {} stocks", connection.node.label, stocks.len());
        Ok(stocks)
    }

    async fn list_datasets(
        &self,
        connection: &Connection,
        stock: &Stock,
        page: PageRequest,
    ) -> ApiResult<DatasetPage> {
        let url = dataset_listing_url(&connection.node, stock, None, page)?;
        tracing::info!("Listing page {} of stock {}", page.index, stock.id);
        let body = self.fetch(connection, &url).await?;
        xml::parse_dataset_page(&body, page)
    }

    async fn search_datasets(
        &self,
        connection: &Connection,
        stock: &Stock,
        query: &str,
        page: PageRequest,
    ) -> ApiResult<DatasetPage> {
        let url = dataset_listing_url(&connection.node, stock, Some(query), page)?;
        tracing::info!("Searching stock {} for '{}' (page {})", stock.id, query, page.index);
        let body = self.fetch(connection, &url).await?;
        xml::parse_dataset_page(&body, page)
    }

    async fn dataset_detail(
        &self,
        connection: &Connection,
        dataset: &Dataset,
    ) -> ApiResult<DatasetDetail> {
        let overview_url = with_overview(endpoint(
            &connection.node,
            &[api::PROCESSES, &dataset.uuid],
        )?);
        let flows_url = with_overview(endpoint(
            &connection.node,
            &[api::PROCESSES, &dataset.uuid, api::EXCHANGES],
        )?);

        let body = self.fetch(connection, &overview_url).await?;
        let mut detail = xml::parse_process_detail(&body)?;

        let body = self.fetch(connection, &flows_url).await?;
        let flows = xml::parse_flows(&body)?;
        detail.enrich(&flows);

        tracing::debug!(
            "Dataset {} has {} exchanges",
            dataset.uuid,
            detail.exchanges.len()
        );
        Ok(detail)
    }

    async fn download_stock(
        &self,
        connection: &Connection,
        stock: &Stock,
        destination: &Path,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> ApiResult<u64> {
        let url = endpoint(&connection.node, &[api::DATASTOCKS, &stock.id, api::EXPORT])?;
        tracing::info!("Downloading stock {} to {}", stock.id, destination.display());
        DownloadHandler::new(&self.http_handler)
            .download_file(
                &url,
                connection.credentials.as_ref(),
                destination,
                self.config.overwrite_downloads,
                progress,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock() -> Stock {
        Stock {
            id: "b3e2a1c4".to_string(),
            name: "Default".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_endpoint_construction() {
        let node = Node::new("ProBas", "https://data.probas.umweltbundesamt.de/");
        let url = endpoint(&node, &[api::DATASTOCKS]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://data.probas.umweltbundesamt.de/resource/datastocks"
        );

        let node = Node::new("Local", "http://localhost:8080/Node/resource");
        let url = endpoint(&node, &[api::DATASTOCKS, "abc", api::EXPORT]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/Node/resource/datastocks/abc/export"
        );
    }

    #[test]
    fn test_listing_url_pagination() {
        let node = Node::new("Local", "http://localhost:8080");
        let url = dataset_listing_url(&node, &stock(), None, PageRequest::new(2, 20)).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/resource/datastocks/b3e2a1c4/processes?startIndex=40&pageSize=20"
        );
    }

    #[test]
    fn test_search_url_encodes_query() {
        let node = Node::new("Local", "http://localhost:8080");
        let url =
            dataset_listing_url(&node, &stock(), Some("steel & iron"), PageRequest::new(0, 10))
                .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("search".to_string(), "true".to_string())));
        assert!(pairs.contains(&("name".to_string(), "steel & iron".to_string())));
        assert!(pairs.contains(&("startIndex".to_string(), "0".to_string())));
    }

    #[test]
    fn test_client_creation() {
        let client = SodaClient::new().unwrap();
        assert!(client.config().overwrite_downloads);
    }
}
