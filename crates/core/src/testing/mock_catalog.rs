//! Mock catalog client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};

use crate::catalog::{CatalogCategory, CatalogClient, CatalogEntry, CatalogError};

/// A recorded catalog search for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCatalogSearch {
    pub base_url: String,
    pub query: String,
    pub page: u32,
}

/// Mock implementation of the CatalogClient trait.
///
/// Behavior is configured per base URL:
/// - canned search results, details and categories
/// - a failure message, returned as `CatalogError::Network` by every call
/// - a hold gate that parks searches until released, to control arrival order
/// - an artificial delay
///
/// # Example
///
/// ```rust,ignore
/// use reelflix_core::testing::{MockCatalogClient, fixtures};
///
/// let catalog = MockCatalogClient::new();
/// catalog.set_results("https://a.example/api", vec![fixtures::catalog_entry(1, "Alpha")]).await;
/// catalog.hold_source("https://b.example/api").await;
///
/// // ... start a session, observe A's results while B is still pending ...
///
/// catalog.release_source("https://b.example/api").await;
/// ```
pub struct MockCatalogClient {
    /// Search results per base URL. Unknown sources return no results.
    results: Arc<RwLock<HashMap<String, Vec<CatalogEntry>>>>,
    /// Item details keyed by (base URL, item id).
    details: Arc<RwLock<HashMap<(String, u64), CatalogEntry>>>,
    /// Categories per base URL.
    categories: Arc<RwLock<HashMap<String, Vec<CatalogCategory>>>>,
    /// Failure messages per base URL.
    failures: Arc<RwLock<HashMap<String, String>>>,
    /// Hold gates per base URL; `false` parks searches.
    gates: Arc<RwLock<HashMap<String, watch::Sender<bool>>>>,
    /// Artificial per-source latency.
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// Recorded searches.
    searches: Arc<RwLock<Vec<RecordedCatalogSearch>>>,
    /// Number of searches started, for waiting in tests.
    search_started: watch::Sender<usize>,
}

impl std::fmt::Debug for MockCatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCatalogClient")
            .field("results", &"<results>")
            .field("details", &"<details>")
            .field("failures", &"<failures>")
            .field("gates", &"<gates>")
            .field("searches", &"<searches>")
            .finish()
    }
}

impl Default for MockCatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogClient {
    pub fn new() -> Self {
        let (search_started, _) = watch::channel(0);
        Self {
            results: Arc::new(RwLock::new(HashMap::new())),
            details: Arc::new(RwLock::new(HashMap::new())),
            categories: Arc::new(RwLock::new(HashMap::new())),
            failures: Arc::new(RwLock::new(HashMap::new())),
            gates: Arc::new(RwLock::new(HashMap::new())),
            delays: Arc::new(RwLock::new(HashMap::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            search_started,
        }
    }

    /// Set the search results one source returns.
    ///
    /// Each entry is also registered as that source's detail for its id.
    pub async fn set_results(&self, base_url: &str, entries: Vec<CatalogEntry>) {
        {
            let mut details = self.details.write().await;
            for entry in &entries {
                details.insert((base_url.to_string(), entry.vod_id), entry.clone());
            }
        }
        self.results
            .write()
            .await
            .insert(base_url.to_string(), entries);
    }

    /// Set the detail returned for one item.
    pub async fn set_detail(&self, base_url: &str, entry: CatalogEntry) {
        self.details
            .write()
            .await
            .insert((base_url.to_string(), entry.vod_id), entry);
    }

    pub async fn set_categories(&self, base_url: &str, categories: Vec<CatalogCategory>) {
        self.categories
            .write()
            .await
            .insert(base_url.to_string(), categories);
    }

    /// Make every call against this source fail with a network error.
    pub async fn fail_source(&self, base_url: &str, message: &str) {
        self.failures
            .write()
            .await
            .insert(base_url.to_string(), message.to_string());
    }

    pub async fn clear_failure(&self, base_url: &str) {
        self.failures.write().await.remove(base_url);
    }

    /// Park searches against this source until [`release_source`] is called.
    ///
    /// [`release_source`]: MockCatalogClient::release_source
    pub async fn hold_source(&self, base_url: &str) {
        let mut gates = self.gates.write().await;
        match gates.get(base_url) {
            Some(gate) => {
                gate.send_replace(false);
            }
            None => {
                let (gate, _) = watch::channel(false);
                gates.insert(base_url.to_string(), gate);
            }
        }
    }

    /// Let parked and future searches against this source proceed.
    pub async fn release_source(&self, base_url: &str) {
        if let Some(gate) = self.gates.read().await.get(base_url) {
            gate.send_replace(true);
        }
    }

    pub async fn set_delay(&self, base_url: &str, delay: Duration) {
        self.delays
            .write()
            .await
            .insert(base_url.to_string(), delay);
    }

    /// Get recorded searches, in the order they started.
    pub async fn recorded_searches(&self) -> Vec<RecordedCatalogSearch> {
        self.searches.read().await.clone()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// Wait until at least `count` searches have started.
    pub async fn wait_for_searches(&self, count: usize) {
        let mut rx = self.search_started.subscribe();
        let _ = rx.wait_for(|started| *started >= count).await;
    }

    async fn failure_for(&self, base_url: &str) -> Option<CatalogError> {
        self.failures
            .read()
            .await
            .get(base_url)
            .map(|message| CatalogError::Network(message.clone()))
    }

    async fn wait_for_gate(&self, base_url: &str) {
        let rx = self.gates.read().await.get(base_url).map(|g| g.subscribe());
        if let Some(mut rx) = rx {
            let _ = rx.wait_for(|open| *open).await;
        }
    }
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    async fn search(
        &self,
        base_url: &str,
        query: &str,
        page: u32,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.searches.write().await.push(RecordedCatalogSearch {
            base_url: base_url.to_string(),
            query: query.to_string(),
            page,
        });
        self.search_started.send_modify(|started| *started += 1);

        self.wait_for_gate(base_url).await;

        let delay = self.delays.read().await.get(base_url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.failure_for(base_url).await {
            return Err(err);
        }

        Ok(self
            .results
            .read()
            .await
            .get(base_url)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_detail(
        &self,
        base_url: &str,
        item_id: u64,
    ) -> Result<Option<CatalogEntry>, CatalogError> {
        if let Some(err) = self.failure_for(base_url).await {
            return Err(err);
        }

        Ok(self
            .details
            .read()
            .await
            .get(&(base_url.to_string(), item_id))
            .cloned())
    }

    async fn categories(&self, base_url: &str) -> Result<Vec<CatalogCategory>, CatalogError> {
        if let Some(err) = self.failure_for(base_url).await {
            return Err(err);
        }

        Ok(self
            .categories
            .read()
            .await
            .get(base_url)
            .cloned()
            .unwrap_or_default())
    }
}
