use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogEntry;
use crate::source::Source;

/// Identifier of one search session, unique per coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of one source within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SourceStatus {
    Pending,
    Succeeded { results: usize },
    Failed { reason: String },
}

impl SourceStatus {
    /// Terminal statuses never change again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SourceStatus::Pending)
    }
}

/// One source's slot in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProgress {
    pub name: String,
    pub base_url: String,
    pub status: SourceStatus,
}

impl SourceProgress {
    pub(crate) fn pending(source: &Source) -> Self {
        Self {
            name: source.name.clone(),
            base_url: source.base_url.clone(),
            status: SourceStatus::Pending,
        }
    }
}

/// How a completed session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// At least one result arrived.
    Results,
    /// Every source settled and none returned anything.
    NoResults,
    /// The session started with an empty source list.
    NoSourcesConfigured,
}

impl SessionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionOutcome::Results => "results",
            SessionOutcome::NoResults => "no_results",
            SessionOutcome::NoSourcesConfigured => "no_sources_configured",
        }
    }
}

/// A catalog entry tagged with the source it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub item_id: u64,
    pub title: String,
    pub year: Option<String>,
    pub cover: Option<String>,
    /// Rating or quality tag shown on the card ("HD", "Episode 12", ...).
    pub remarks: Option<String>,
    pub type_name: Option<String>,
    pub source_name: String,
    pub source_base_url: String,
}

impl ResultItem {
    pub fn from_entry(entry: CatalogEntry, source_name: &str, source_base_url: &str) -> Self {
        Self {
            item_id: entry.vod_id,
            title: entry.vod_name,
            year: entry.vod_year,
            cover: entry.vod_pic,
            remarks: entry.vod_remarks,
            type_name: entry.type_name,
            source_name: source_name.to_string(),
            source_base_url: source_base_url.to_string(),
        }
    }
}

/// Point-in-time view of a session.
///
/// Published as a whole on every change, so a reader never sees a result
/// whose source is still pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub query: String,
    /// Source slots in registry order at session start.
    pub sources: Vec<SourceProgress>,
    /// Results in arrival order.
    pub results: Vec<ResultItem>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub outcome: Option<SessionOutcome>,
    /// Set when a newer session replaced this one before it completed.
    pub abandoned: bool,
}

impl SessionSnapshot {
    pub(crate) fn new(id: SessionId, query: &str, sources: &[Source]) -> Self {
        Self {
            id,
            query: query.to_string(),
            sources: sources.iter().map(SourceProgress::pending).collect(),
            results: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
            outcome: None,
            abandoned: false,
        }
    }

    pub fn total_sources(&self) -> usize {
        self.sources.len()
    }

    pub fn completed_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| s.status.is_terminal())
            .count()
    }

    /// `(completed, total)` source counts.
    pub fn progress(&self) -> (usize, usize) {
        (self.completed_sources(), self.total_sources())
    }

    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Whether the session will not change any more.
    pub fn is_settled(&self) -> bool {
        self.is_complete() || self.abandoned
    }

    pub fn status_of(&self, source_name: &str) -> Option<&SourceStatus> {
        self.sources
            .iter()
            .find(|s| s.name == source_name)
            .map(|s| &s.status)
    }

    /// Failed sources with their reasons.
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.sources
            .iter()
            .filter_map(|s| match &s.status {
                SourceStatus::Failed { reason } => Some((s.name.as_str(), reason.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Append one source's results and mark it succeeded in one step.
    ///
    /// Returns false if the slot is unknown or already terminal.
    pub(crate) fn append_results(&mut self, slot: usize, items: Vec<ResultItem>) -> bool {
        match self.sources.get_mut(slot) {
            Some(progress) if !progress.status.is_terminal() => {
                progress.status = SourceStatus::Succeeded {
                    results: items.len(),
                };
                self.results.extend(items);
                true
            }
            _ => false,
        }
    }

    /// Mark one source failed. Returns false if the slot is unknown or terminal.
    pub(crate) fn mark_source_failed(&mut self, slot: usize, reason: String) -> bool {
        match self.sources.get_mut(slot) {
            Some(progress) if !progress.status.is_terminal() => {
                progress.status = SourceStatus::Failed { reason };
                true
            }
            _ => false,
        }
    }

    /// Set `completed_at` and the outcome once every source is terminal.
    pub(crate) fn finalize_if_done(&mut self) -> Option<SessionOutcome> {
        if self.completed_at.is_some() || self.completed_sources() < self.total_sources() {
            return None;
        }

        let outcome = if self.sources.is_empty() {
            SessionOutcome::NoSourcesConfigured
        } else if self.results.is_empty() {
            SessionOutcome::NoResults
        } else {
            SessionOutcome::Results
        };
        self.completed_at = Some(Utc::now());
        self.outcome = Some(outcome);
        Some(outcome)
    }
}

/// Which source's results a reader wants to see.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceFilter {
    #[default]
    All,
    Source(String),
}

impl SourceFilter {
    /// Parse a UI filter value; `"all"` (any case) or empty means every source.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            SourceFilter::All
        } else {
            SourceFilter::Source(value.to_string())
        }
    }

    pub fn matches(&self, item: &ResultItem) -> bool {
        match self {
            SourceFilter::All => true,
            SourceFilter::Source(name) => item.source_name == *name,
        }
    }
}

/// Project session results onto the selected source, keeping arrival order.
pub fn filter_by_visible_source(results: &[ResultItem], filter: &SourceFilter) -> Vec<ResultItem> {
    results
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn item(source: &str, id: u64) -> ResultItem {
        ResultItem::from_entry(fixtures::catalog_entry(id, "Title"), source, "https://x/")
    }

    #[test]
    fn test_result_item_carries_provenance() {
        let item = ResultItem::from_entry(fixtures::catalog_entry(3, "Three"), "Alpha", fixtures::BASE_A);
        assert_eq!(item.item_id, 3);
        assert_eq!(item.title, "Three");
        assert_eq!(item.remarks.as_deref(), Some("HD"));
        assert_eq!(item.source_name, "Alpha");
        assert_eq!(item.source_base_url, fixtures::BASE_A);
    }

    #[test]
    fn test_append_marks_succeeded_atomically() {
        let mut snapshot = SessionSnapshot::new(SessionId(1), "q", &fixtures::sources());
        assert!(snapshot.append_results(0, vec![item("Alpha", 1), item("Alpha", 2)]));

        assert_eq!(
            snapshot.status_of("Alpha"),
            Some(&SourceStatus::Succeeded { results: 2 })
        );
        assert_eq!(snapshot.results.len(), 2);
        assert_eq!(snapshot.progress(), (1, 3));
        assert!(!snapshot.is_complete());
    }

    #[test]
    fn test_terminal_slots_never_revert() {
        let mut snapshot = SessionSnapshot::new(SessionId(1), "q", &fixtures::sources());
        assert!(snapshot.mark_source_failed(1, "timeout".to_string()));
        assert!(!snapshot.append_results(1, vec![item("Beta", 1)]));
        assert!(!snapshot.mark_source_failed(1, "again".to_string()));
        assert!(!snapshot.mark_source_failed(7, "no such slot".to_string()));

        assert!(snapshot.results.is_empty());
        assert_eq!(snapshot.failures(), vec![("Beta", "timeout")]);
    }

    #[test]
    fn test_finalize_outcomes() {
        let mut empty = SessionSnapshot::new(SessionId(1), "q", &[]);
        assert_eq!(empty.finalize_if_done(), Some(SessionOutcome::NoSourcesConfigured));
        assert!(empty.is_complete());
        assert_eq!(empty.finalize_if_done(), None);

        let sources = fixtures::sources();
        let mut failed = SessionSnapshot::new(SessionId(2), "q", &sources[..1]);
        assert_eq!(failed.finalize_if_done(), None);
        failed.mark_source_failed(0, "down".to_string());
        assert_eq!(failed.finalize_if_done(), Some(SessionOutcome::NoResults));

        let mut found = SessionSnapshot::new(SessionId(3), "q", &sources[..1]);
        found.append_results(0, vec![item("Alpha", 1)]);
        assert_eq!(found.finalize_if_done(), Some(SessionOutcome::Results));
    }

    #[test]
    fn test_filter_by_visible_source() {
        let results = vec![item("Alpha", 1), item("Beta", 2), item("Alpha", 3)];

        let all = filter_by_visible_source(&results, &SourceFilter::All);
        assert_eq!(all, results);

        let alpha = filter_by_visible_source(&results, &SourceFilter::Source("Alpha".into()));
        assert_eq!(alpha.iter().map(|i| i.item_id).collect::<Vec<_>>(), vec![1, 3]);

        let none = filter_by_visible_source(&results, &SourceFilter::Source("Zeta".into()));
        assert!(none.is_empty());
    }

    #[test]
    fn test_source_filter_parse() {
        assert_eq!(SourceFilter::parse("all"), SourceFilter::All);
        assert_eq!(SourceFilter::parse("ALL"), SourceFilter::All);
        assert_eq!(SourceFilter::parse(" "), SourceFilter::All);
        assert_eq!(
            SourceFilter::parse("Beta"),
            SourceFilter::Source("Beta".to_string())
        );
    }
}
