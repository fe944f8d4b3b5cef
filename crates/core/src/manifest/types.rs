use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;

use super::parse_manifest;

/// One playable episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub name: String,
    pub url: String,
}

/// A named cluster of episodes served by one upstream mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeGroup {
    pub name: String,
    pub episodes: Vec<Episode>,
}

/// The raw playback descriptor attached to a catalog item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackManifest {
    pub play_from: String,
    pub play_url: String,
}

impl PlaybackManifest {
    pub fn new(play_from: impl Into<String>, play_url: impl Into<String>) -> Self {
        Self {
            play_from: play_from.into(),
            play_url: play_url.into(),
        }
    }

    pub fn from_entry(entry: &CatalogEntry) -> Self {
        Self::new(entry.vod_play_from.clone(), entry.vod_play_url.clone())
    }

    /// Parse into playable episode groups.
    pub fn groups(&self) -> Vec<EpisodeGroup> {
        parse_manifest(&self.play_from, &self.play_url)
    }
}
