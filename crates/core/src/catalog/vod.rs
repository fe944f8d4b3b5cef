//! reqwest-backed client for "provide/vod" catalog APIs.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::CatalogConfig;

use super::{CatalogCategory, CatalogClient, CatalogEntry, CatalogError, CatalogPage};

/// HTTP catalog client.
///
/// The base URL is supplied per call, so one client serves every source.
#[derive(Debug, Clone)]
pub struct VodClient {
    client: Client,
}

impl VodClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs as u64));
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let client = builder
            .build()
            .map_err(|e| CatalogError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn fetch_page(&self, url: &str) -> Result<CatalogPage, CatalogError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout
            } else {
                CatalogError::Network(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Http {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        response
            .json::<CatalogPage>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CatalogClient for VodClient {
    async fn search(
        &self,
        base_url: &str,
        query: &str,
        page: u32,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let url = build_search_url(base_url, query, page);
        debug!(base_url = base_url, query = query, page = page, "Searching catalog");

        let page = self.fetch_page(&url).await?;
        debug!(base_url = base_url, results = page.list.len(), "Catalog search complete");
        Ok(page.list)
    }

    async fn fetch_detail(
        &self,
        base_url: &str,
        item_id: u64,
    ) -> Result<Option<CatalogEntry>, CatalogError> {
        let url = build_detail_url(base_url, item_id);
        debug!(base_url = base_url, item_id = item_id, "Fetching catalog detail");

        let page = self.fetch_page(&url).await?;
        Ok(page.list.into_iter().next())
    }

    async fn categories(&self, base_url: &str) -> Result<Vec<CatalogCategory>, CatalogError> {
        debug!(base_url = base_url, "Fetching catalog categories");
        let page = self.fetch_page(base_url).await?;
        Ok(page.class)
    }
}

/// Append query parameters, respecting a query string already on the base URL.
fn with_params(base_url: &str, params: &[(&str, String)]) -> String {
    let mut url = base_url.to_string();
    let mut sep = if url.contains('?') { '&' } else { '?' };
    for (key, value) in params {
        url.push(sep);
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
        sep = '&';
    }
    url
}

fn build_search_url(base_url: &str, query: &str, page: u32) -> String {
    with_params(
        base_url,
        &[
            ("ac", "videolist".to_string()),
            ("pg", page.to_string()),
            ("wd", query.to_string()),
        ],
    )
}

fn build_detail_url(base_url: &str, item_id: u64) -> String {
    with_params(
        base_url,
        &[("ac", "videolist".to_string()), ("ids", item_id.to_string())],
    )
}
