//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Search sessions and per-source queries
//! - The session throttle
//! - Playback resolution

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Search Metrics
// =============================================================================

/// Completed search sessions by outcome.
pub static SEARCH_SESSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelflix_search_sessions_total",
            "Total search sessions that reached a terminal state",
        ),
        &["outcome"], // "results", "no_results", "no_sources_configured"
    )
    .unwrap()
});

/// Per-source query outcomes.
pub static SOURCE_QUERIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelflix_source_queries_total",
            "Total per-source catalog queries",
        ),
        &["result"], // "succeeded", "failed", "discarded"
    )
    .unwrap()
});

/// Per-source query duration in seconds.
pub static SOURCE_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reelflix_source_query_duration_seconds",
            "Duration of a single catalog search query",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0]),
        &["result"],
    )
    .unwrap()
});

/// Result items accepted into sessions.
pub static SEARCH_RESULTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reelflix_search_results_total",
        "Total result items appended to search sessions",
    )
    .unwrap()
});

// =============================================================================
// Throttle Metrics
// =============================================================================

/// Throttle admissions by result.
pub static THROTTLE_ADMISSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelflix_throttle_admissions_total",
            "Total search requests seen by the session throttle",
        ),
        &["result"], // "immediate", "delayed", "superseded"
    )
    .unwrap()
});

// =============================================================================
// Playback Metrics
// =============================================================================

/// Playback resolutions by result.
pub static PLAYBACK_RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelflix_playback_resolutions_total",
            "Total playback manifest resolutions",
        ),
        &["result"], // "playable", "unplayable", "not_found", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Search
        Box::new(SEARCH_SESSIONS.clone()),
        Box::new(SOURCE_QUERIES.clone()),
        Box::new(SOURCE_QUERY_DURATION.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        // Throttle
        Box::new(THROTTLE_ADMISSIONS.clone()),
        // Playback
        Box::new(PLAYBACK_RESOLUTIONS.clone()),
    ]
}
