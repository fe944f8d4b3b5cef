//! Search session API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use reelflix_core::{
    filter_by_visible_source, ResultItem, SearchError, SessionId, SessionOutcome,
    SessionSnapshot, SourceFilter, SourceProgress,
};
use serde::{Deserialize, Serialize};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct CurrentSearchParams {
    /// Source name to show, or `all`.
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: SessionId,
    pub query: String,
    pub sources: Vec<SourceProgress>,
    pub results: Vec<ResultItem>,
    pub completed_sources: usize,
    pub total_sources: usize,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SessionOutcome>,
    pub abandoned: bool,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionResponse {
    fn from_snapshot(snapshot: SessionSnapshot, filter: &SourceFilter) -> Self {
        let (completed_sources, total_sources) = snapshot.progress();
        Self {
            results: filter_by_visible_source(&snapshot.results, filter),
            complete: snapshot.is_complete(),
            id: snapshot.id,
            query: snapshot.query,
            sources: snapshot.sources,
            completed_sources,
            total_sources,
            outcome: snapshot.outcome,
            abandoned: snapshot.abandoned,
            started_at: snapshot.started_at,
            completed_at: snapshot.completed_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/search
///
/// Start a session over the current registry. Waits out the throttle first;
/// a request replaced by a newer one while waiting gets 409.
pub async fn submit_search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let handle = state
        .coordinator()
        .submit(&body.query, state.registry().as_ref())
        .await
        .map_err(|e| {
            let status = match e {
                SearchError::EmptyQuery => StatusCode::BAD_REQUEST,
                SearchError::Superseded => StatusCode::CONFLICT,
            };
            api_error(status, e.to_string())
        })?;

    let snapshot = handle.snapshot();
    let broadcaster = state.ws_broadcaster().clone();
    broadcaster.session_started(&snapshot);
    tokio::spawn(async move { broadcaster.forward_session(handle).await });

    Ok((
        StatusCode::ACCEPTED,
        Json(SessionResponse::from_snapshot(snapshot, &SourceFilter::All)),
    ))
}

/// GET /api/v1/search/current
///
/// The current session, with results narrowed to `?source=<name>` if given.
pub async fn current_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CurrentSearchParams>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = state
        .coordinator()
        .current_session()
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "No search session"))?;

    let filter = params
        .source
        .as_deref()
        .map(SourceFilter::parse)
        .unwrap_or_default();

    Ok(Json(SessionResponse::from_snapshot(
        handle.snapshot(),
        &filter,
    )))
}
