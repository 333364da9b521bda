//! Core application logic for bwilcd
//!
//! This module contains the node registry, the soda4LCA HTTP client, the XML
//! response parsers, the data models and the navigation state machine.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bwilcd::app::{NodeRegistry, Session, SessionConfig, SodaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SodaClient::new()?;
//! let registry = NodeRegistry::bundled()?;
//! let mut session = Session::new(client, registry, SessionConfig::default());
//!
//! session.connect("1", None).await?;
//! session.select(1).await?;
//! if let Some(browse) = session.state().browse() {
//!     for dataset in &browse.page.datasets {
//!         println!("{} {}", dataset.uuid, dataset.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod models;
pub mod registry;
pub mod session;
pub mod xml;

// Re-export main public API
pub use client::{CatalogApi, ClientConfig, SodaClient};
pub use models::{
    Connection, Dataset, DatasetDetail, DatasetPage, Direction, Exchange, FlowInfo, Node,
    PageRequest, Stock,
};
pub use registry::NodeRegistry;
pub use session::{BrowseState, NavState, Outcome, Session, SessionConfig, StateKind};
