//! Source registry API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use reelflix_core::{CatalogCategory, Source, SourceError, SourceRegistry};
use serde::Serialize;
use tracing::warn;

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub sources: Vec<Source>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub source: String,
    pub categories: Vec<CatalogCategory>,
}

fn source_error(e: SourceError) -> ApiError {
    let status = match e {
        SourceError::InvalidName => StatusCode::BAD_REQUEST,
        SourceError::DuplicateName(_) => StatusCode::CONFLICT,
        SourceError::NotFound(_) => StatusCode::NOT_FOUND,
    };
    api_error(status, e.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/sources
pub async fn list_sources(State(state): State<Arc<AppState>>) -> Json<SourcesResponse> {
    Json(SourcesResponse {
        sources: state.registry().list_sources().await,
    })
}

/// POST /api/v1/sources
///
/// Add a source. Running sessions keep the sources they started with.
pub async fn add_source(
    State(state): State<Arc<AppState>>,
    Json(source): Json<Source>,
) -> Result<(StatusCode, Json<Source>), ApiError> {
    let source = source.trimmed();
    state
        .registry()
        .add_source(source.clone())
        .await
        .map_err(source_error)?;

    Ok((StatusCode::CREATED, Json(source)))
}

/// DELETE /api/v1/sources/{name}
pub async fn remove_source(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .registry()
        .remove_source(&name)
        .await
        .map_err(source_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sources/{name}/categories
///
/// Fetch the category list straight from the source's catalog.
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let source = state
        .registry()
        .get(&name)
        .await
        .ok_or_else(|| source_error(SourceError::NotFound(name.clone())))?;

    match state.catalog().categories(&source.base_url).await {
        Ok(categories) => Ok(Json(CategoriesResponse {
            source: source.name,
            categories,
        })),
        Err(e) => {
            warn!(source = %source.name, error = %e, "Category fetch failed");
            Err(api_error(StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}
