//! Catalog client abstraction.
//!
//! A catalog is a third-party "provide/vod" style JSON API. The `CatalogClient`
//! trait performs exactly one HTTP call per operation and knows nothing about
//! search sessions; `VodClient` is the reqwest-backed implementation.

mod types;
mod vod;

pub use types::*;
pub use vod::VodClient;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to a catalog.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Catalog connection failed: {0}")]
    Network(String),

    #[error("Catalog request timed out")]
    Timeout,

    #[error("Catalog returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Failed to parse catalog response: {0}")]
    Parse(String),
}

/// Trait for catalog backends.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Search one catalog for `query`, returning entries in catalog order.
    async fn search(
        &self,
        base_url: &str,
        query: &str,
        page: u32,
    ) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Fetch the full entry (including playback fields) for one item.
    ///
    /// Returns `Ok(None)` when the catalog answers but does not know the item.
    async fn fetch_detail(
        &self,
        base_url: &str,
        item_id: u64,
    ) -> Result<Option<CatalogEntry>, CatalogError>;

    /// List the catalog's categories.
    async fn categories(&self, base_url: &str) -> Result<Vec<CatalogCategory>, CatalogError>;
}
