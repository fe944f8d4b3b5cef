//! Deduplication of session results by (source name, item id).

use std::collections::HashSet;

use super::ResultItem;

/// Drop incoming items already present in `existing` or repeated within
/// `incoming`. The first occurrence wins and order is preserved.
pub fn deduplicate_results(existing: &[ResultItem], incoming: Vec<ResultItem>) -> Vec<ResultItem> {
    let mut seen: HashSet<(String, u64)> = existing
        .iter()
        .map(|item| (item.source_name.clone(), item.item_id))
        .collect();

    incoming
        .into_iter()
        .filter(|item| seen.insert((item.source_name.clone(), item.item_id)))
        .collect()
}
