//! Shared fixtures for integration tests
//!
//! `StubCatalog` answers every catalog call from memory so session and REPL
//! behaviour can be checked without a network.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use bwilcd::app::{
    CatalogApi, Connection, Dataset, DatasetDetail, DatasetPage, Node, NodeRegistry, PageRequest,
    Session, SessionConfig, Stock,
};
use bwilcd::auth::SecretPrompt;
use bwilcd::errors::{ApiError, ApiResult};

/// In-memory catalog with a failure switch and a call log
#[derive(Default)]
pub struct StubCatalog {
    pub stocks: Vec<Stock>,
    /// Every dataset of every stock; pages are sliced from this
    pub datasets: Vec<Dataset>,
    /// Archive contents written by `download_stock`
    pub archive: Vec<u8>,
    /// Leave `totalSize` out of listings, like some nodes do
    pub omit_total: bool,
    /// When set, every call fails with a connection error
    pub fail: Cell<bool>,
    pub calls: RefCell<Vec<String>>,
}

impl StubCatalog {
    pub fn new(stock_count: usize, dataset_count: usize) -> Self {
        Self {
            stocks: (1..=stock_count).map(stock).collect(),
            datasets: (1..=dataset_count).map(dataset).collect(),
            archive: b"PK\x03\x04 stub archive".to_vec(),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn record(&self, call: String) -> ApiResult<()> {
        self.calls.borrow_mut().push(call);
        if self.fail.get() {
            return Err(ApiError::Connection {
                url: "http://stub.invalid".to_string(),
                reason: "connection failed".to_string(),
            });
        }
        Ok(())
    }

    fn page_of(&self, matching: Vec<Dataset>, page: PageRequest) -> DatasetPage {
        let total = matching.len();
        let datasets = matching
            .into_iter()
            .skip(page.start_index())
            .take(page.size)
            .collect();
        DatasetPage::new(datasets, page, (!self.omit_total).then_some(total))
    }
}

impl CatalogApi for StubCatalog {
    async fn list_stocks(&self, connection: &Connection) -> ApiResult<Vec<Stock>> {
        self.record(format!("stocks {}", connection.node.label))?;
        Ok(self.stocks.clone())
    }

    async fn list_datasets(
        &self,
        _connection: &Connection,
        stock: &Stock,
        page: PageRequest,
    ) -> ApiResult<DatasetPage> {
        self.record(format!("list {} {}", stock.id, page.index))?;
        Ok(self.page_of(self.datasets.clone(), page))
    }

    async fn search_datasets(
        &self,
        _connection: &Connection,
        stock: &Stock,
        query: &str,
        page: PageRequest,
    ) -> ApiResult<DatasetPage> {
        self.record(format!("search {} {} {}", stock.id, query, page.index))?;
        let needle = query.to_lowercase();
        let matching = self
            .datasets
            .iter()
            .filter(|d| d.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(self.page_of(matching, page))
    }

    async fn dataset_detail(
        &self,
        _connection: &Connection,
        dataset: &Dataset,
    ) -> ApiResult<DatasetDetail> {
        self.record(format!("detail {}", dataset.uuid))?;
        Ok(DatasetDetail {
            uuid: Some(dataset.uuid.clone()),
            name: Some(dataset.name.clone()),
            ..Default::default()
        })
    }

    async fn download_stock(
        &self,
        _connection: &Connection,
        stock: &Stock,
        destination: &Path,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> ApiResult<u64> {
        self.record(format!("download {}", stock.id))?;
        std::fs::write(destination, &self.archive)?;
        let size = self.archive.len() as u64;
        progress(size, Some(size));
        Ok(size)
    }
}

/// Password prompt that answers from a fixed value
pub struct FixedPrompt(pub &'static str);

impl SecretPrompt for FixedPrompt {
    fn prompt_secret(&mut self, _label: &str) -> std::io::Result<String> {
        Ok(self.0.to_string())
    }
}

pub fn stock(n: usize) -> Stock {
    Stock {
        id: format!("stock-{}", n),
        name: format!("Stock {}", n),
        description: format!("Description {}", n),
    }
}

pub fn dataset(n: usize) -> Dataset {
    Dataset {
        uuid: format!("uuid-{:03}", n),
        name: if n % 2 == 0 {
            format!("Steel {}", n)
        } else {
            format!("Cement {}", n)
        },
        version: "01.00.000".to_string(),
        location: Some("DE".to_string()),
    }
}

pub fn registry() -> NodeRegistry {
    NodeRegistry::from_nodes(vec![
        Node::new("Stub", "http://stub.invalid"),
        Node::new("Other", "http://other.invalid"),
    ])
}

pub fn session(api: StubCatalog, download_dir: PathBuf) -> Session<StubCatalog> {
    Session::new(
        api,
        registry(),
        SessionConfig {
            page_size: 20,
            download_dir,
        },
    )
}
