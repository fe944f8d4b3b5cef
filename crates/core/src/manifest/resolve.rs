use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{CatalogClient, CatalogEntry, CatalogError};
use crate::metrics::PLAYBACK_RESOLUTIONS;

use super::{Episode, EpisodeGroup, PlaybackManifest};

/// Errors from resolving an item into playable streams.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Item {item_id} not found in catalog")]
    NotFound { item_id: u64 },
}

/// A catalog item with its playback manifest parsed.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedPlayback {
    pub entry: CatalogEntry,
    pub groups: Vec<EpisodeGroup>,
}

impl ResolvedPlayback {
    pub fn from_entry(entry: CatalogEntry) -> Self {
        let groups = PlaybackManifest::from_entry(&entry).groups();
        Self { entry, groups }
    }

    /// Episode at the given group/episode position.
    pub fn episode(&self, group_idx: usize, episode_idx: usize) -> Option<&Episode> {
        self.groups.get(group_idx)?.episodes.get(episode_idx)
    }

    /// What the player starts with: first episode of the first group.
    pub fn default_episode(&self) -> Option<&Episode> {
        self.episode(0, 0)
    }

    pub fn is_playable(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// Fetch one item's detail from its catalog and parse its playback manifest.
///
/// An item with no playable episodes still resolves; callers check
/// [`ResolvedPlayback::is_playable`].
pub async fn resolve_playback(
    client: &dyn CatalogClient,
    base_url: &str,
    item_id: u64,
) -> Result<ResolvedPlayback, PlaybackError> {
    let entry = match client.fetch_detail(base_url, item_id).await {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            PLAYBACK_RESOLUTIONS.with_label_values(&["not_found"]).inc();
            return Err(PlaybackError::NotFound { item_id });
        }
        Err(e) => {
            warn!(base_url = base_url, item_id = item_id, error = %e, "Detail fetch failed");
            PLAYBACK_RESOLUTIONS.with_label_values(&["failed"]).inc();
            return Err(e.into());
        }
    };

    let resolved = ResolvedPlayback::from_entry(entry);
    debug!(
        item_id = item_id,
        groups = resolved.groups.len(),
        "Playback manifest resolved"
    );

    let label = if resolved.is_playable() { "playable" } else { "unplayable" };
    PLAYBACK_RESOLUTIONS.with_label_values(&[label]).inc();

    Ok(resolved)
}
