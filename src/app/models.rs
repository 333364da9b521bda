//! Data models for ILCD Network catalogs
//!
//! Nodes, stocks, datasets and dataset details as the client sees them.
//! Everything here is plain data fetched fresh from a node; nothing is
//! persisted between sessions.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::Credentials;
use crate::constants::api;
use crate::errors::{ApiError, ApiResult};

/// An ILCD Network node: a labelled base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Short human label ("ProBas")
    #[serde(rename = "name")]
    pub label: String,
    /// Base URL of the node, with or without the `/resource` suffix
    #[serde(rename = "url")]
    pub base_url: String,
}

impl Node {
    /// Create a node from a label and a base URL
    pub fn new(label: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            base_url: base_url.into(),
        }
    }

    /// Service API root of this node
    ///
    /// Trailing slashes are dropped and `/resource` is appended unless the
    /// base URL already ends with it. The returned URL always ends with `/`
    /// so relative joins stay below it.
    pub fn resource_url(&self) -> ApiResult<Url> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ApiError::InvalidUrl {
                url: self.base_url.clone(),
                error: "empty base URL".to_string(),
            });
        }

        let suffix = format!("/{}", api::RESOURCE_SEGMENT);
        let root = if trimmed.ends_with(&suffix) {
            format!("{}/", trimmed)
        } else {
            format!("{}{}/", trimmed, suffix)
        };

        let url = Url::parse(&root).map_err(|e| ApiError::InvalidUrl {
            url: self.base_url.clone(),
            error: e.to_string(),
        })?;

        if url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: self.base_url.clone(),
                error: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(url)
    }
}

/// A node together with the credentials to send on each request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub node: Node,
    pub credentials: Option<Credentials>,
}

impl Connection {
    /// Anonymous connection
    pub fn anonymous(node: Node) -> Self {
        Self {
            node,
            credentials: None,
        }
    }

    /// Connection sending basic-auth credentials
    pub fn authenticated(node: Node, credentials: Credentials) -> Self {
        Self {
            node,
            credentials: Some(credentials),
        }
    }
}

/// A data stock hosted by a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Stock UUID
    pub id: String,
    /// Short name
    pub name: String,
    /// Free-text description, empty when the node has none
    pub description: String,
}

/// A process dataset inside a stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub uuid: String,
    pub name: String,
    /// Dataset version ("00.01.000"), empty when unknown
    pub version: String,
    /// Location code ("DE", "GLO") when the listing provides one
    pub location: Option<String>,
}

/// Which slice of a listing to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page number
    pub index: usize,
    /// Datasets per page
    pub size: usize,
}

impl PageRequest {
    pub fn new(index: usize, size: usize) -> Self {
        Self { index, size }
    }

    /// Offset of the first dataset on this page
    pub fn start_index(&self) -> usize {
        self.index * self.size
    }
}

/// One page of a dataset listing or search
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatasetPage {
    pub datasets: Vec<Dataset>,
    /// Offset of the first dataset in the full result set
    pub start_index: usize,
    /// Size of the full result set, when the node reports it
    pub total_size: Option<usize>,
    /// Whether another page follows this one
    pub has_more: bool,
}

impl DatasetPage {
    /// Assemble a page, deciding `has_more` from what the node reported
    ///
    /// With a `totalSize` the answer is exact; without one a full page is
    /// taken to mean more may follow.
    pub fn new(datasets: Vec<Dataset>, request: PageRequest, total_size: Option<usize>) -> Self {
        let start_index = request.start_index();
        let has_more = match total_size {
            Some(total) => start_index + datasets.len() < total,
            None => request.size > 0 && datasets.len() == request.size,
        };
        Self {
            datasets,
            start_index,
            total_size,
            has_more,
        }
    }

    /// An empty final page
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, Some(request.start_index()))
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Direction of an exchange relative to the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
    Unknown,
}

impl Direction {
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            t if t.eq_ignore_ascii_case("input") => Direction::Input,
            t if t.eq_ignore_ascii_case("output") => Direction::Output,
            _ => Direction::Unknown,
        }
    }
}

/// An input or output flow of a process
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub flow_uuid: Option<String>,
    pub flow_name: String,
    pub direction: Direction,
    pub amount: f64,
    pub is_reference_flow: bool,
    pub flow_type: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
}

/// Flow metadata from the exchange listing, used to enrich exchanges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowInfo {
    pub uuid: String,
    pub name: String,
    pub flow_type: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
}

/// Full description of a single process dataset
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatasetDetail {
    pub uuid: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub reference_year: Option<String>,
    pub geography: Option<String>,
    pub technology: Option<String>,
    pub functional_unit: Option<String>,
    pub has_reference_flow: bool,
    pub exchanges: Vec<Exchange>,
}

impl DatasetDetail {
    /// Attach flow type, category and unit to matching exchanges
    ///
    /// Exchanges without a matching flow are dropped, mirroring how the
    /// node's exchange listing defines the visible set.
    pub fn enrich(&mut self, flows: &[FlowInfo]) {
        self.exchanges.retain_mut(|exchange| {
            let Some(uuid) = exchange.flow_uuid.as_deref() else {
                return false;
            };
            match flows.iter().find(|flow| flow.uuid == uuid) {
                Some(flow) => {
                    exchange.flow_type = flow.flow_type.clone();
                    exchange.category = flow.category.clone();
                    exchange.unit = flow.unit.clone();
                    true
                }
                None => false,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_url_appends_suffix() {
        let node = Node::new("ProBas", "https://data.probas.umweltbundesamt.de/");
        let url = node.resource_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://data.probas.umweltbundesamt.de/resource/"
        );
    }

    #[test]
    fn test_resource_url_keeps_existing_suffix() {
        let node = Node::new("x", "https://node.example/app/resource");
        let url = node.resource_url().unwrap();
        assert_eq!(url.as_str(), "https://node.example/app/resource/");
    }

    #[test]
    fn test_resource_url_rejects_garbage() {
        assert!(Node::new("x", "").resource_url().is_err());
        assert!(Node::new("x", "not a url").resource_url().is_err());
    }

    #[test]
    fn test_page_has_more_with_total() {
        let request = PageRequest::new(1, 2);
        let datasets = vec![dataset("a"), dataset("b")];
        let page = DatasetPage::new(datasets.clone(), request, Some(5));
        assert_eq!(page.start_index, 2);
        assert!(page.has_more);

        let page = DatasetPage::new(datasets, request, Some(4));
        assert!(!page.has_more);
    }

    #[test]
    fn test_page_has_more_without_total() {
        let request = PageRequest::new(0, 2);
        assert!(DatasetPage::new(vec![dataset("a"), dataset("b")], request, None).has_more);
        assert!(!DatasetPage::new(vec![dataset("a")], request, None).has_more);
        assert!(!DatasetPage::empty(request).has_more);
    }

    #[test]
    fn test_enrich_drops_unknown_flows() {
        let mut detail = DatasetDetail {
            exchanges: vec![exchange(Some("f1")), exchange(Some("f2")), exchange(None)],
            ..Default::default()
        };
        let flows = vec![FlowInfo {
            uuid: "f1".into(),
            name: "Electricity".into(),
            flow_type: Some("Product flow".into()),
            category: Some("Energy".into()),
            unit: Some("MJ".into()),
        }];

        detail.enrich(&flows);

        assert_eq!(detail.exchanges.len(), 1);
        assert_eq!(detail.exchanges[0].unit.as_deref(), Some("MJ"));
        assert_eq!(detail.exchanges[0].category.as_deref(), Some("Energy"));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("Input"), Direction::Input);
        assert_eq!(Direction::parse(" output "), Direction::Output);
        assert_eq!(Direction::parse("sideways"), Direction::Unknown);
    }

    fn dataset(uuid: &str) -> Dataset {
        Dataset {
            uuid: uuid.into(),
            name: uuid.to_uppercase(),
            version: String::new(),
            location: None,
        }
    }

    fn exchange(flow: Option<&str>) -> Exchange {
        Exchange {
            flow_uuid: flow.map(str::to_string),
            flow_name: "flow".into(),
            direction: Direction::Output,
            amount: 1.0,
            is_reference_flow: false,
            flow_type: None,
            category: None,
            unit: None,
        }
    }
}
