//! Deduplication of harvested records.

use std::collections::HashSet;

use crate::models::BookRecord;

/// Keep the first record for each title, preserving order.
///
/// Titles are compared exactly. Records without a title share one key, so only the
/// first untitled record survives.
pub fn deduplicate_by_title(records: Vec<BookRecord>) -> Vec<BookRecord> {
    let mut seen: HashSet<Option<String>> = HashSet::with_capacity(records.len());

    records
        .into_iter()
        .filter(|record| seen.insert(record.title.clone()))
        .collect()
}

/// Indices of records that [`deduplicate_by_title`] would drop.
pub fn find_duplicates(records: &[BookRecord]) -> Vec<usize> {
    let mut seen: HashSet<Option<&str>> = HashSet::with_capacity(records.len());

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| !seen.insert(record.title.as_deref()))
        .map(|(i, _)| i)
        .collect()
}
