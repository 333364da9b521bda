//! Prelude module for bwilcd
//!
//! Re-exports the items needed to drive a session programmatically with a
//! single `use bwilcd::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use bwilcd::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::load(None).await?;
//!     let client = SodaClient::with_config(config.client_config())?;
//!     let mut session = Session::new(client, config.node_registry()?, config.session_config());
//!
//!     session.connect("ProBas", None).await?;
//!     if let Some(stocks) = session.state().stocks() {
//!         println!("{} stocks", stocks.len());
//!     }
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

pub use crate::app::{
    CatalogApi, ClientConfig, Connection, Dataset, DatasetDetail, DatasetPage, NavState, Node,
    NodeRegistry, Outcome, PageRequest, Session, SessionConfig, SodaClient, StateKind, Stock,
};
pub use crate::auth::{Credentials, SecretPrompt};
pub use crate::config::AppConfig;
