//! Playback API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use reelflix_core::{resolve_playback, CatalogEntry, Episode, EpisodeGroup, PlaybackError};
use serde::{Deserialize, Serialize};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlayParams {
    /// Base URL of the catalog the item came from.
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub item_id: u64,
    pub source: String,
    pub detail: CatalogEntry,
    pub groups: Vec<EpisodeGroup>,
    /// First episode of the first group; what the player starts with.
    pub default_episode: Option<Episode>,
    pub playable: bool,
}

/// GET /api/v1/play/{item_id}?source=<baseUrl>
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<u64>,
    Query(params): Query<PlayParams>,
) -> Result<Json<PlayResponse>, ApiError> {
    let resolved = resolve_playback(state.catalog(), &params.source, item_id)
        .await
        .map_err(|e| {
            let status = match e {
                PlaybackError::NotFound { .. } => StatusCode::NOT_FOUND,
                PlaybackError::Catalog(_) => StatusCode::BAD_GATEWAY,
            };
            api_error(status, e.to_string())
        })?;

    Ok(Json(PlayResponse {
        item_id,
        source: params.source,
        default_episode: resolved.default_episode().cloned(),
        playable: resolved.is_playable(),
        detail: resolved.entry,
        groups: resolved.groups,
    }))
}
