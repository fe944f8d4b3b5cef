//! Multi-source search sessions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::state::SessionState;
use super::{ResultItem, SearchError, SessionId, SessionSnapshot};
use crate::catalog::{CatalogClient, CatalogEntry, CatalogError};
use crate::metrics::{SOURCE_QUERIES, SOURCE_QUERY_DURATION};
use crate::source::{unique_by_name, Source, SourceRegistry};
use crate::throttle::{Admission, SearchThrottle};

/// Read side of one session: a live, subscribable view.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    query: String,
    rx: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current state of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.rx.borrow().clone()
    }

    /// A receiver that is notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.rx.clone()
    }

    /// Wait until the session completes or is abandoned.
    pub async fn wait_until_settled(&self) -> SessionSnapshot {
        let mut rx = self.rx.clone();
        let settled = rx.wait_for(|s| s.is_settled()).await.map(|s| s.clone());
        settled.unwrap_or_else(|_| rx.borrow().clone())
    }
}

struct ActiveSession {
    handle: SessionHandle,
    state: SessionState,
    tasks: Vec<AbortHandle>,
}

/// Runs search sessions against every configured source.
///
/// One coordinator has at most one current session. Starting a new session
/// abandons the previous one; outcomes still in flight for it are dropped.
pub struct SearchCoordinator {
    catalog: Arc<dyn CatalogClient>,
    throttle: Arc<SearchThrottle>,
    page: u32,
    next_id: AtomicU64,
    /// Id of the current session; in-flight queries compare against it.
    current: Arc<AtomicU64>,
    active: Mutex<Option<ActiveSession>>,
}

impl SearchCoordinator {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self {
            catalog,
            throttle: Arc::new(SearchThrottle::default()),
            page: 1,
            next_id: AtomicU64::new(1),
            current: Arc::new(AtomicU64::new(0)),
            active: Mutex::new(None),
        }
    }

    pub fn with_throttle(mut self, throttle: Arc<SearchThrottle>) -> Self {
        self.throttle = throttle;
        self
    }

    /// Catalog page requested from every source (default 1).
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn throttle(&self) -> &Arc<SearchThrottle> {
        &self.throttle
    }

    /// Throttle, snapshot the registry, then start a session.
    ///
    /// Returns [`SearchError::Superseded`] if a newer submission replaced this
    /// one while it waited on the throttle.
    pub async fn submit(
        &self,
        query: &str,
        registry: &dyn SourceRegistry,
    ) -> Result<SessionHandle, SearchError> {
        let query = validate_query(query)?;

        if let Admission::Superseded = self.throttle.admit().await {
            return Err(SearchError::Superseded);
        }

        let sources = registry.list_sources().await;
        self.start_session(query, sources).await
    }

    /// Start a session over `sources` right away, abandoning any current one.
    ///
    /// Source names are trimmed and only the first source of each name is
    /// queried.
    pub async fn start_session(
        &self,
        query: &str,
        sources: Vec<Source>,
    ) -> Result<SessionHandle, SearchError> {
        let query = validate_query(query)?;

        let requested = sources.len();
        let sources = unique_by_name(sources.into_iter().map(Source::trimmed));
        if sources.len() != requested {
            warn!(
                skipped = requested - sources.len(),
                "Skipping sources with duplicate names"
            );
        }

        let mut active = self.active.lock().await;

        let id = SessionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.current.store(id.0, Ordering::SeqCst);

        if let Some(previous) = active.take() {
            if previous.state.abandon() {
                info!(
                    session_id = %previous.handle.id,
                    replaced_by = %id,
                    "Abandoned unfinished search session"
                );
            }
            for task in previous.tasks {
                task.abort();
            }
        }

        info!(
            session_id = %id,
            query = %query,
            sources = sources.len(),
            "Starting search session"
        );

        let state = SessionState::new(id, query, &sources);
        let handle = SessionHandle {
            id,
            query: query.to_string(),
            rx: state.subscribe(),
        };

        let tasks = sources
            .into_iter()
            .enumerate()
            .map(|(slot, source)| self.spawn_source_query(id, slot, source, query, &state))
            .collect();

        *active = Some(ActiveSession {
            handle: handle.clone(),
            state,
            tasks,
        });

        Ok(handle)
    }

    /// Handle of the current session, if any has been started.
    pub async fn current_session(&self) -> Option<SessionHandle> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|active| active.handle.clone())
    }

    fn spawn_source_query(
        &self,
        id: SessionId,
        slot: usize,
        source: Source,
        query: &str,
        state: &SessionState,
    ) -> AbortHandle {
        let catalog = Arc::clone(&self.catalog);
        let current = Arc::clone(&self.current);
        let state = state.clone();
        let query = query.to_string();
        let page = self.page;

        let task = tokio::spawn(async move {
            let started = Instant::now();
            let outcome = catalog.search(&source.base_url, &query, page).await;
            let elapsed = started.elapsed().as_secs_f64();
            apply_outcome(&current, id, slot, &source, &state, outcome, elapsed);
        });

        task.abort_handle()
    }
}

/// Publish one source's outcome into its session.
///
/// Returns `false` without touching `state` when `id` is no longer the
/// current session.
fn apply_outcome(
    current: &AtomicU64,
    id: SessionId,
    slot: usize,
    source: &Source,
    state: &SessionState,
    outcome: Result<Vec<CatalogEntry>, CatalogError>,
    elapsed: f64,
) -> bool {
    if current.load(Ordering::SeqCst) != id.0 {
        debug!(
            session_id = %id,
            source = %source.name,
            "Discarding outcome for stale session"
        );
        SOURCE_QUERIES.with_label_values(&["discarded"]).inc();
        return false;
    }

    match outcome {
        Ok(entries) => {
            SOURCE_QUERY_DURATION
                .with_label_values(&["succeeded"])
                .observe(elapsed);
            SOURCE_QUERIES.with_label_values(&["succeeded"]).inc();
            debug!(
                session_id = %id,
                source = %source.name,
                results = entries.len(),
                "Source returned results"
            );

            let items = entries
                .into_iter()
                .map(|entry| ResultItem::from_entry(entry, &source.name, &source.base_url))
                .collect();
            state.record_success(slot, items)
        }
        Err(e) => {
            SOURCE_QUERY_DURATION
                .with_label_values(&["failed"])
                .observe(elapsed);
            SOURCE_QUERIES.with_label_values(&["failed"]).inc();
            warn!(
                session_id = %id,
                source = %source.name,
                base_url = %source.base_url,
                error = %e,
                "Source search failed"
            );
            state.record_failure(slot, e.to_string())
        }
    }
}

fn validate_query(query: &str) -> Result<&str, SearchError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SessionOutcome, SourceStatus};
    use crate::source::InMemorySourceRegistry;
    use crate::testing::{fixtures, MockCatalogClient};
    use std::time::Duration;

    fn coordinator(catalog: &Arc<MockCatalogClient>) -> SearchCoordinator {
        SearchCoordinator::new(catalog.clone())
            .with_throttle(Arc::new(SearchThrottle::new(Duration::ZERO)))
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let catalog = Arc::new(MockCatalogClient::new());
        let coordinator = coordinator(&catalog);

        let err = coordinator
            .start_session("   ", fixtures::sources())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::EmptyQuery));
        assert!(coordinator.current_session().await.is_none());
        assert_eq!(catalog.search_count().await, 0);
    }

    #[tokio::test]
    async fn test_no_sources_completes_immediately() {
        let catalog = Arc::new(MockCatalogClient::new());
        let coordinator = coordinator(&catalog);

        let handle = coordinator.start_session("matrix", vec![]).await.unwrap();
        let snapshot = handle.snapshot();

        assert!(snapshot.is_complete());
        assert_eq!(snapshot.outcome, Some(SessionOutcome::NoSourcesConfigured));
        assert!(snapshot.results.is_empty());
    }

    #[tokio::test]
    async fn test_results_are_tagged_with_source() {
        let catalog = Arc::new(MockCatalogClient::new());
        catalog
            .set_results(fixtures::BASE_A, vec![fixtures::catalog_entry(1, "Alpha One")])
            .await;
        catalog
            .set_results(fixtures::BASE_B, vec![fixtures::catalog_entry(2, "Beta Two")])
            .await;
        let coordinator = coordinator(&catalog);

        let handle = coordinator
            .start_session(" matrix ", fixtures::sources()[..2].to_vec())
            .await
            .unwrap();
        assert_eq!(handle.query(), "matrix");

        let snapshot = handle.wait_until_settled().await;
        assert_eq!(snapshot.outcome, Some(SessionOutcome::Results));
        assert_eq!(snapshot.results.len(), 2);
        for item in &snapshot.results {
            let expected_base = if item.source_name == "Alpha" {
                fixtures::BASE_A
            } else {
                fixtures::BASE_B
            };
            assert_eq!(item.source_base_url, expected_base);
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_other_sources() {
        let catalog = Arc::new(MockCatalogClient::new());
        catalog.fail_source(fixtures::BASE_A, "connection refused").await;
        catalog
            .set_results(fixtures::BASE_B, vec![fixtures::catalog_entry(2, "Beta")])
            .await;
        let coordinator = coordinator(&catalog);

        let handle = coordinator
            .start_session("q", fixtures::sources()[..2].to_vec())
            .await
            .unwrap();
        let snapshot = handle.wait_until_settled().await;

        let expected_reason = CatalogError::Network("connection refused".to_string()).to_string();
        assert_eq!(
            snapshot.status_of("Alpha"),
            Some(&SourceStatus::Failed {
                reason: expected_reason
            })
        );
        assert_eq!(
            snapshot.status_of("Beta"),
            Some(&SourceStatus::Succeeded { results: 1 })
        );
        assert_eq!(snapshot.outcome, Some(SessionOutcome::Results));
        assert_eq!(catalog.search_count().await, 2);
    }

    #[tokio::test]
    async fn test_new_session_abandons_previous() {
        let catalog = Arc::new(MockCatalogClient::new());
        catalog.hold_source(fixtures::BASE_A).await;
        let coordinator = coordinator(&catalog);

        let first = coordinator
            .start_session("first", fixtures::sources()[..1].to_vec())
            .await
            .unwrap();
        catalog.wait_for_searches(1).await;

        let second = coordinator.start_session("second", vec![]).await.unwrap();
        catalog.release_source(fixtures::BASE_A).await;

        let first = first.wait_until_settled().await;
        assert!(first.abandoned);
        assert!(!first.is_complete());
        assert_eq!(first.status_of("Alpha"), Some(&SourceStatus::Pending));

        assert_ne!(first.id, second.id());
        let current = coordinator.current_session().await.unwrap();
        assert_eq!(current.id(), second.id());
    }

    #[test]
    fn test_outcome_for_stale_session_is_discarded() {
        let source = fixtures::sources()[0].clone();
        let state = SessionState::new(SessionId(1), "q", &[source.clone()]);
        let current = AtomicU64::new(2);

        let applied = apply_outcome(
            &current,
            SessionId(1),
            0,
            &source,
            &state,
            Ok(vec![fixtures::catalog_entry(1, "Late")]),
            0.1,
        );

        assert!(!applied);
        let snapshot = state.subscribe().borrow().clone();
        assert!(snapshot.results.is_empty());
        assert_eq!(snapshot.status_of("Alpha"), Some(&SourceStatus::Pending));
    }

    #[test]
    fn test_outcome_for_current_session_is_applied() {
        let source = fixtures::sources()[0].clone();
        let state = SessionState::new(SessionId(1), "q", &[source.clone()]);
        let current = AtomicU64::new(1);

        let applied = apply_outcome(
            &current,
            SessionId(1),
            0,
            &source,
            &state,
            Err(CatalogError::Timeout),
            0.1,
        );

        assert!(applied);
        let snapshot = state.subscribe().borrow().clone();
        assert!(matches!(
            snapshot.status_of("Alpha"),
            Some(SourceStatus::Failed { .. })
        ));
        assert_eq!(snapshot.outcome, Some(SessionOutcome::NoResults));
    }

    #[tokio::test]
    async fn test_duplicate_source_names_are_queried_once() {
        let catalog = Arc::new(MockCatalogClient::new());
        catalog
            .set_results(fixtures::BASE_A, vec![fixtures::catalog_entry(1, "One")])
            .await;
        let coordinator = coordinator(&catalog);

        let handle = coordinator
            .start_session(
                "q",
                vec![
                    Source::new("Alpha", fixtures::BASE_A),
                    Source::new(" Alpha ", fixtures::BASE_B),
                    Source::new("Beta", fixtures::BASE_B),
                ],
            )
            .await
            .unwrap();
        let snapshot = handle.wait_until_settled().await;

        assert_eq!(snapshot.total_sources(), 2);
        assert_eq!(
            snapshot.status_of("Alpha"),
            Some(&SourceStatus::Succeeded { results: 1 })
        );
        assert_eq!(catalog.search_count().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_source_is_visible_before_slow_one() {
        let catalog = Arc::new(MockCatalogClient::new());
        catalog
            .set_results(fixtures::BASE_A, vec![fixtures::catalog_entry(1, "Fast")])
            .await;
        catalog
            .set_results(fixtures::BASE_B, vec![fixtures::catalog_entry(2, "Slow")])
            .await;
        catalog
            .set_delay(fixtures::BASE_B, Duration::from_secs(10))
            .await;
        let coordinator = coordinator(&catalog);

        let handle = coordinator
            .start_session("q", fixtures::sources()[..2].to_vec())
            .await
            .unwrap();
        let mut rx = handle.subscribe();
        let partial = rx
            .wait_for(|snapshot| snapshot.completed_sources() >= 1)
            .await
            .unwrap()
            .clone();

        assert!(!partial.is_complete());
        assert_eq!(partial.results.len(), 1);
        assert_eq!(partial.results[0].title, "Fast");
        assert_eq!(partial.status_of("Beta"), Some(&SourceStatus::Pending));

        let settled = handle.wait_until_settled().await;
        assert_eq!(settled.results.len(), 2);
        assert_eq!(settled.outcome, Some(SessionOutcome::Results));
    }

    #[tokio::test]
    async fn test_submit_uses_registry_snapshot() {
        let catalog = Arc::new(MockCatalogClient::new());
        let registry = InMemorySourceRegistry::new(fixtures::sources());
        let coordinator = coordinator(&catalog).with_page(3);

        let handle = coordinator.submit("query", &registry).await.unwrap();
        registry
            .add_source(Source::new("Late", "https://late.example/"))
            .await
            .unwrap();

        let snapshot = handle.wait_until_settled().await;
        assert_eq!(snapshot.total_sources(), 3);
        assert_eq!(snapshot.outcome, Some(SessionOutcome::NoResults));

        let searches = catalog.recorded_searches().await;
        assert_eq!(searches.len(), 3);
        assert!(searches.iter().all(|s| s.page == 3 && s.query == "query"));
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_query_before_throttle() {
        let catalog = Arc::new(MockCatalogClient::new());
        let registry = InMemorySourceRegistry::new(fixtures::sources());
        let coordinator = coordinator(&catalog);

        assert!(matches!(
            coordinator.submit("", &registry).await,
            Err(SearchError::EmptyQuery)
        ));
        assert!(coordinator.throttle().last_started_at().await.is_none());
    }
}
