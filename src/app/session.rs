//! Navigation state machine
//!
//! A session moves from `Disconnected` to `Connected` (a node and its stock
//! list) to `StockSelected` (one stock and a page of its datasets). Every
//! transition performs its fetch first and only assigns the new state once
//! the fetch succeeded, so a failure leaves the session exactly as it was.

use std::path::PathBuf;

use url::Url;

use crate::app::client::CatalogApi;
use crate::app::models::{Connection, DatasetDetail, DatasetPage, Node, PageRequest, Stock};
use crate::app::registry::NodeRegistry;
use crate::auth::Credentials;
use crate::constants::{api, files};
use crate::errors::{ApiResult, InputResult, Result, UserInputError};

/// Settings that shape browsing and downloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Datasets requested per page
    pub page_size: usize,
    /// Directory stock archives are written to
    pub download_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: api::DEFAULT_PAGE_SIZE,
            download_dir: PathBuf::from("."),
        }
    }
}

/// The stock being browsed and the page currently shown
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseState {
    pub stock: Stock,
    /// Zero-based page number
    pub page_index: usize,
    /// Active search, `None` while listing everything
    pub last_query: Option<String>,
    pub page: DatasetPage,
}

/// Where the user currently is
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NavState {
    #[default]
    Disconnected,
    Connected {
        connection: Connection,
        stocks: Vec<Stock>,
    },
    StockSelected {
        connection: Connection,
        stocks: Vec<Stock>,
        browse: BrowseState,
    },
}

/// Payload-free view of [`NavState`], used for command permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Disconnected,
    Connected,
    StockSelected,
}

impl StateKind {
    /// Phrase used in "not available while ..." messages
    pub fn describe(self) -> &'static str {
        match self {
            StateKind::Disconnected => "disconnected",
            StateKind::Connected => "connected to a node",
            StateKind::StockSelected => "browsing a stock",
        }
    }
}

impl NavState {
    pub fn kind(&self) -> StateKind {
        match self {
            NavState::Disconnected => StateKind::Disconnected,
            NavState::Connected { .. } => StateKind::Connected,
            NavState::StockSelected { .. } => StateKind::StockSelected,
        }
    }

    pub fn connection(&self) -> Option<&Connection> {
        match self {
            NavState::Disconnected => None,
            NavState::Connected { connection, .. }
            | NavState::StockSelected { connection, .. } => Some(connection),
        }
    }

    pub fn stocks(&self) -> Option<&[Stock]> {
        match self {
            NavState::Disconnected => None,
            NavState::Connected { stocks, .. } | NavState::StockSelected { stocks, .. } => {
                Some(stocks)
            }
        }
    }

    pub fn browse(&self) -> Option<&BrowseState> {
        match self {
            NavState::StockSelected { browse, .. } => Some(browse),
            _ => None,
        }
    }
}

/// What a transition produced, for the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Back at the node list
    Nodes,
    /// Stock list of the current node is (re)shown
    Stocks,
    /// Current dataset page is (re)shown
    Datasets,
    /// `next` on the last page
    NoMorePages,
    /// `prev` on the first page
    AlreadyFirstPage,
    /// Detail of one dataset
    Detail(Box<DatasetDetail>),
    /// Archive written to disk
    Downloaded {
        stock: String,
        path: PathBuf,
        bytes: u64,
    },
}

/// Interactive session over a catalog
pub struct Session<A: CatalogApi> {
    api: A,
    registry: NodeRegistry,
    config: SessionConfig,
    state: NavState,
}

impl<A: CatalogApi> Session<A> {
    pub fn new(api: A, registry: NodeRegistry, config: SessionConfig) -> Self {
        Self {
            api,
            registry,
            config,
            state: NavState::Disconnected,
        }
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Connect to a registry node given by number or label
    pub async fn connect(&mut self, key: &str, credentials: Option<Credentials>) -> Result<Outcome> {
        self.require("connect", &[StateKind::Disconnected, StateKind::Connected])?;
        let node = self.registry.lookup(key)?.clone();
        self.connect_node(node, credentials).await
    }

    /// Connect to a node that is not in the registry
    pub async fn connect_url(
        &mut self,
        raw: &str,
        credentials: Option<Credentials>,
    ) -> Result<Outcome> {
        self.require("url", &[StateKind::Disconnected, StateKind::Connected])?;
        let node = node_from_url(raw)?;
        self.connect_node(node, credentials).await
    }

    async fn connect_node(
        &mut self,
        node: Node,
        credentials: Option<Credentials>,
    ) -> Result<Outcome> {
        let connection = match credentials {
            Some(credentials) => Connection::authenticated(node, credentials),
            None => Connection::anonymous(node),
        };
        tracing::info!("Connecting to {} ({})", connection.node.label, connection.node.base_url);

        let stocks = self.api.list_stocks(&connection).await?;
        if stocks.is_empty() {
            tracing::warn!("Node {} lists no stocks", connection.node.label);
        }
        self.state = NavState::Connected { connection, stocks };
        Ok(Outcome::Stocks)
    }

    /// Re-fetch the stock list of the current node
    pub async fn refresh(&mut self) -> Result<Outcome> {
        let NavState::Connected { connection, .. } = &self.state else {
            return Err(self.not_allowed("refresh").into());
        };
        let fresh = self.api.list_stocks(connection).await?;
        if let NavState::Connected { stocks, .. } = &mut self.state {
            *stocks = fresh;
        }
        Ok(Outcome::Stocks)
    }

    /// Open stock `number` (1-based) and fetch its first page
    pub async fn select(&mut self, number: usize) -> Result<Outcome> {
        let NavState::Connected { connection, stocks } = &self.state else {
            return Err(self.not_allowed("select").into());
        };
        let stock = pick(stocks, number, "stock")?.clone();
        let request = PageRequest::new(0, self.config.page_size);
        let page = self.api.list_datasets(connection, &stock, request).await?;
        tracing::info!("Selected stock {} ({} datasets on first page)", stock.name, page.datasets.len());

        let browse = BrowseState {
            stock,
            page_index: 0,
            last_query: None,
            page,
        };
        self.state = NavState::StockSelected {
            connection: connection.clone(),
            stocks: stocks.clone(),
            browse,
        };
        Ok(Outcome::Datasets)
    }

    /// Go up one level
    pub fn back(&mut self) -> Result<Outcome> {
        match std::mem::take(&mut self.state) {
            NavState::Disconnected => Err(self.not_allowed("back").into()),
            NavState::Connected { connection, .. } => {
                tracing::info!("Disconnected from {}", connection.node.label);
                Ok(Outcome::Nodes)
            }
            NavState::StockSelected {
                connection, stocks, ..
            } => {
                self.state = NavState::Connected { connection, stocks };
                Ok(Outcome::Stocks)
            }
        }
    }

    /// Search the current stock by dataset name, starting at page 0
    pub async fn search(&mut self, query: &str) -> Result<Outcome> {
        let query = query.trim();
        self.require("search", &[StateKind::StockSelected])?;
        if query.is_empty() {
            return Err(UserInputError::MissingArgument {
                command: "search",
                expected: "a search term",
            }
            .into());
        }
        self.load_page(Some(query.to_string()), 0).await?;
        Ok(Outcome::Datasets)
    }

    /// Drop the search and list the whole stock from page 0
    pub async fn list_all(&mut self) -> Result<Outcome> {
        self.require("list-all", &[StateKind::StockSelected])?;
        self.load_page(None, 0).await?;
        Ok(Outcome::Datasets)
    }

    pub async fn next(&mut self) -> Result<Outcome> {
        let browse = self.browse_or_reject("next")?;
        if !browse.page.has_more {
            return Ok(Outcome::NoMorePages);
        }
        let (query, index) = (browse.last_query.clone(), browse.page_index + 1);
        // Without totalSize a full page only suggests more data
        let page = self.fetch_page(query.as_deref(), index).await?;
        if page.is_empty() {
            tracing::debug!("Page {} came back empty, staying on page {}", index, index - 1);
            return Ok(Outcome::NoMorePages);
        }
        self.commit_page(query, index, page);
        Ok(Outcome::Datasets)
    }

    pub async fn prev(&mut self) -> Result<Outcome> {
        let browse = self.browse_or_reject("prev")?;
        if browse.page_index == 0 {
            return Ok(Outcome::AlreadyFirstPage);
        }
        let (query, index) = (browse.last_query.clone(), browse.page_index - 1);
        self.load_page(query, index).await?;
        Ok(Outcome::Datasets)
    }

    /// Show the detail of dataset `number`, counted across pages
    pub async fn view(&self, number: usize) -> Result<Outcome> {
        let NavState::StockSelected {
            connection, browse, ..
        } = &self.state
        else {
            return Err(self.not_allowed("view").into());
        };

        let page = &browse.page;
        if page.is_empty() {
            return Err(UserInputError::NothingToChoose { kind: "dataset" }.into());
        }
        let first = page.start_index + 1;
        let last = page.start_index + page.datasets.len();
        if number < first || number > last {
            return Err(UserInputError::OutOfRange {
                kind: "dataset",
                index: number,
                min: first,
                max: last,
            }
            .into());
        }

        let dataset = &page.datasets[number - first];
        let detail = self.api.dataset_detail(connection, dataset).await?;
        Ok(Outcome::Detail(Box::new(detail)))
    }

    /// Download a stock archive into the download directory
    ///
    /// While connected a stock number is required. While browsing, the
    /// current stock is used unless a number picks another one; an active
    /// search does not narrow the archive.
    pub async fn download(
        &self,
        number: Option<usize>,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> Result<Outcome> {
        let (connection, stock) = match (&self.state, number) {
            (NavState::Disconnected, _) => return Err(self.not_allowed("download").into()),
            (NavState::Connected { .. }, None) => {
                return Err(UserInputError::MissingArgument {
                    command: "download",
                    expected: "a stock number",
                }
                .into())
            }
            (NavState::Connected { connection, stocks }, Some(n))
            | (NavState::StockSelected { connection, stocks, .. }, Some(n)) => {
                (connection, pick(stocks, n, "stock")?)
            }
            (NavState::StockSelected { connection, browse, .. }, None) => {
                (connection, &browse.stock)
            }
        };

        let path = self.archive_path(stock);
        let bytes = self
            .api
            .download_stock(connection, stock, &path, progress)
            .await?;
        Ok(Outcome::Downloaded {
            stock: stock.name.clone(),
            path,
            bytes,
        })
    }

    /// Destination of a stock's archive
    pub fn archive_path(&self, stock: &Stock) -> PathBuf {
        let name: String = stock
            .id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.config
            .download_dir
            .join(format!("{}.{}", name, files::ARCHIVE_EXTENSION))
    }

    async fn load_page(&mut self, query: Option<String>, index: usize) -> Result<()> {
        let page = self.fetch_page(query.as_deref(), index).await?;
        self.commit_page(query, index, page);
        Ok(())
    }

    /// Fetch a page of the current stock without touching the state
    async fn fetch_page(&self, query: Option<&str>, index: usize) -> Result<DatasetPage> {
        let NavState::StockSelected {
            connection, browse, ..
        } = &self.state
        else {
            return Err(self.not_allowed("browse").into());
        };
        let request = PageRequest::new(index, self.config.page_size);
        Ok(request_page(&self.api, connection, &browse.stock, query, request).await?)
    }

    fn commit_page(&mut self, query: Option<String>, index: usize, page: DatasetPage) {
        if let NavState::StockSelected { browse, .. } = &mut self.state {
            browse.page_index = index;
            browse.last_query = query;
            browse.page = page;
        }
    }

    fn browse_or_reject(&self, command: &'static str) -> InputResult<&BrowseState> {
        self.state.browse().ok_or_else(|| self.not_allowed(command))
    }

    fn require(&self, command: &'static str, allowed: &[StateKind]) -> InputResult<()> {
        if allowed.contains(&self.kind()) {
            Ok(())
        } else {
            Err(self.not_allowed(command))
        }
    }

    fn not_allowed(&self, command: &'static str) -> UserInputError {
        UserInputError::NotAllowed {
            command,
            state: self.kind().describe(),
        }
    }
}

async fn request_page<A: CatalogApi>(
    api: &A,
    connection: &Connection,
    stock: &Stock,
    query: Option<&str>,
    request: PageRequest,
) -> ApiResult<DatasetPage> {
    match query {
        Some(query) => api.search_datasets(connection, stock, query, request).await,
        None => api.list_datasets(connection, stock, request).await,
    }
}

/// 1-based pick from a listing
fn pick<'a, T>(items: &'a [T], number: usize, kind: &'static str) -> InputResult<&'a T> {
    if items.is_empty() {
        return Err(UserInputError::NothingToChoose { kind });
    }
    number
        .checked_sub(1)
        .and_then(|i| items.get(i))
        .ok_or(UserInputError::OutOfRange {
            kind,
            index: number,
            min: 1,
            max: items.len(),
        })
}

/// Build an ad-hoc node from user input, assuming `https://` without a scheme
pub fn node_from_url(raw: &str) -> InputResult<Node> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UserInputError::MissingArgument {
            command: "url",
            expected: "a node URL",
        });
    }
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let invalid = |reason: String| UserInputError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    let host = url
        .host_str()
        .ok_or_else(|| invalid("missing host".to_string()))?
        .to_string();

    Ok(Node::new(host, candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_from_url() {
        let node = node_from_url("oekobaudat.de/OEKOBAU.DAT").unwrap();
        assert_eq!(node.base_url, "https://oekobaudat.de/OEKOBAU.DAT");
        assert_eq!(node.label, "oekobaudat.de");

        let node = node_from_url("http://localhost:8080/Node").unwrap();
        assert_eq!(node.base_url, "http://localhost:8080/Node");

        assert!(matches!(
            node_from_url("ftp://example.org"),
            Err(UserInputError::InvalidUrl { .. })
        ));
        assert!(matches!(
            node_from_url("   "),
            Err(UserInputError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_pick_bounds() {
        let items = ["a", "b", "c"];
        assert_eq!(pick(&items, 1, "stock"), Ok(&"a"));
        assert_eq!(pick(&items, 3, "stock"), Ok(&"c"));
        assert!(matches!(
            pick(&items, 4, "stock"),
            Err(UserInputError::OutOfRange { max: 3, .. })
        ));
        assert!(matches!(
            pick(&items, 0, "stock"),
            Err(UserInputError::OutOfRange { .. })
        ));
        let empty: [&str; 0] = [];
        assert_eq!(
            pick(&empty, 1, "stock"),
            Err(UserInputError::NothingToChoose { kind: "stock" })
        );
    }

    #[test]
    fn test_state_kind_descriptions() {
        assert_eq!(NavState::default().kind(), StateKind::Disconnected);
        assert_eq!(StateKind::StockSelected.describe(), "browsing a stock");
    }
}
