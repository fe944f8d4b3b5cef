use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::source::Source;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Initial contents of the source registry, in display order.
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Search session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Minimum time between two search sessions starting (milliseconds).
    #[serde(default = "default_min_interval")]
    pub min_interval_ms: u64,
    /// Catalog page requested from every source.
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_min_interval() -> u64 {
    5000
}

fn default_page() -> u32 {
    1
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval(),
            page: default_page(),
        }
    }
}

/// Catalog HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Request timeout in seconds (default: 15)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Optional User-Agent header sent to catalogs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_timeout() -> u32 {
    15
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: None,
        }
    }
}
