//! Testing utilities and mock implementations.
//!
//! This module provides a mock of the catalog trait and fixtures, allowing
//! search sessions and playback to be exercised without real catalogs.
//!
//! # Example
//!
//! ```rust,ignore
//! use reelflix_core::testing::{MockCatalogClient, fixtures};
//!
//! let catalog = MockCatalogClient::new();
//! catalog.set_results(fixtures::BASE_A, vec![fixtures::catalog_entry(1, "Alpha")]).await;
//! catalog.fail_source(fixtures::BASE_B, "connection reset").await;
//!
//! // Use in a SearchCoordinator or AppState...
//! ```

mod mock_catalog;

pub use mock_catalog::{MockCatalogClient, RecordedCatalogSearch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{CatalogCategory, CatalogEntry};
    use crate::source::Source;

    pub const BASE_A: &str = "https://a.example/api.php/provide/vod/";
    pub const BASE_B: &str = "https://b.example/api.php/provide/vod/";
    pub const BASE_C: &str = "https://c.example/api.php/provide/vod/";

    /// Create a catalog entry with a single one-episode stream group.
    pub fn catalog_entry(id: u64, name: &str) -> CatalogEntry {
        CatalogEntry {
            vod_id: id,
            vod_name: name.to_string(),
            type_name: Some("Movie".to_string()),
            vod_pic: Some(format!("https://img.example/{}.jpg", id)),
            vod_remarks: Some("HD".to_string()),
            vod_year: Some("2023".to_string()),
            vod_area: None,
            vod_lang: None,
            vod_content: None,
            vod_play_from: "m3u8".to_string(),
            vod_play_url: format!("Full$https://stream.example/{}/index.m3u8", id),
        }
    }

    /// Create a series entry with `episodes` episodes in one group.
    pub fn series_entry(id: u64, name: &str, episodes: usize) -> CatalogEntry {
        let play_url = (1..=episodes)
            .map(|n| format!("EP{:02}$https://stream.example/{}/{}.m3u8", n, id, n))
            .collect::<Vec<_>>()
            .join("#");

        CatalogEntry {
            type_name: Some("Series".to_string()),
            vod_play_url: play_url,
            ..catalog_entry(id, name)
        }
    }

    /// Create an entry whose manifest has no playable streams.
    pub fn unplayable_entry(id: u64, name: &str) -> CatalogEntry {
        CatalogEntry {
            vod_play_from: "web".to_string(),
            vod_play_url: format!("Full$https://watch.example/{}.html", id),
            ..catalog_entry(id, name)
        }
    }

    pub fn category(type_id: u64, type_name: &str) -> CatalogCategory {
        CatalogCategory {
            type_id,
            type_name: type_name.to_string(),
        }
    }

    /// The three standard test sources, in registry order.
    pub fn sources() -> Vec<Source> {
        vec![
            Source::new("Alpha", BASE_A),
            Source::new("Beta", BASE_B),
            Source::new("Gamma", BASE_C),
        ]
    }
}
