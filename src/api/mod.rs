//! Access to the remote table store that holds the published records and the administrator
//! accounts.
//!
//! The `Store` trait is the seam between the app and the network. `RestStore` talks to the hosted
//! store, `TestStore` keeps everything in memory so the whole app can run without one. `Remote`
//! sits on top of either and speaks in terms of ledger records and users.

mod remote;
mod rest;
mod store;
mod test_store;

use crate::{Config, Result};
use tracing::debug;

pub use remote::Remote;
pub(crate) use remote::RemoteRecord;
pub(crate) use store::{Filter, Store};
pub(crate) use test_store::{TestStore, TestStoreState};

/// The environment variable that switches the app to the in-memory store.
pub const TEST_MODE_VAR: &str = "FUND_IN_TEST_MODE";

/// Selects which `Store` implementation is used.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Talk to the hosted store over HTTP.
    #[default]
    Remote,
    /// Keep the tables in memory.
    Testing,
}

impl Mode {
    /// Returns `Mode::Testing` when `FUND_IN_TEST_MODE` is set to a non-empty value, otherwise
    /// `Mode::Remote`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_VAR) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Remote,
        }
    }
}

/// Creates the `Store` for `mode`.
pub(crate) async fn store(config: &Config, mode: Mode) -> Result<Box<dyn Store + Send>> {
    match mode {
        Mode::Remote => {
            let api_key = config.api_key().await?;
            Ok(Box::new(rest::RestStore::new(config.store_url(), api_key)?))
        }
        Mode::Testing => {
            debug!("Using the in-memory store for {}", config.store_url());
            Ok(Box::new(TestStore::new(config.store_url())))
        }
    }
}

/// Creates a `Remote` for the tables named in `config`.
pub async fn remote(config: &Config, mode: Mode) -> Result<Remote> {
    let store = store(config, mode).await?;
    Ok(Remote::new(store, config.tables().clone()))
}
