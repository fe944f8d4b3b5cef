//! Live session state shared between source tasks and readers.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use super::dedup::deduplicate_results;
use super::{ResultItem, SessionId, SessionOutcome, SessionSnapshot};
use crate::metrics::{SEARCH_RESULTS, SEARCH_SESSIONS};
use crate::source::Source;

/// Writer side of one session.
///
/// Every mutation goes through the watch channel, so readers only ever see
/// whole snapshots.
#[derive(Clone)]
pub(crate) struct SessionState {
    tx: Arc<watch::Sender<SessionSnapshot>>,
}

impl SessionState {
    pub fn new(id: SessionId, query: &str, sources: &[Source]) -> Self {
        let mut snapshot = SessionSnapshot::new(id, query, sources);
        if let Some(outcome) = snapshot.finalize_if_done() {
            record_completion(&snapshot, outcome);
        }
        let (tx, _) = watch::channel(snapshot);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Append a source's results and mark it succeeded.
    pub fn record_success(&self, slot: usize, items: Vec<ResultItem>) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.abandoned {
                return false;
            }
            let items = deduplicate_results(&snapshot.results, items);
            let count = items.len() as u64;
            if !snapshot.append_results(slot, items) {
                return false;
            }
            SEARCH_RESULTS.inc_by(count);
            if let Some(outcome) = snapshot.finalize_if_done() {
                record_completion(snapshot, outcome);
            }
            true
        })
    }

    pub fn record_failure(&self, slot: usize, reason: String) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.abandoned || !snapshot.mark_source_failed(slot, reason) {
                return false;
            }
            if let Some(outcome) = snapshot.finalize_if_done() {
                record_completion(snapshot, outcome);
            }
            true
        })
    }

    /// Freeze an incomplete session. Completed sessions are left untouched.
    pub fn abandon(&self) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.is_settled() {
                return false;
            }
            snapshot.abandoned = true;
            true
        })
    }
}

fn record_completion(snapshot: &SessionSnapshot, outcome: SessionOutcome) {
    info!(
        session_id = %snapshot.id,
        query = %snapshot.query,
        results = snapshot.results.len(),
        failed_sources = snapshot.failures().len(),
        outcome = outcome.as_str(),
        "Search session complete"
    );
    SEARCH_SESSIONS.with_label_values(&[outcome.as_str()]).inc();
}
