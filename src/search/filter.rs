//! Prefix filtering of a loaded result list.

use super::normalize::normalize_term;
use crate::types::{FilterOutcome, ResultEntry};

/// What to filter for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterQuery {
    /// Show rows whose id starts with the normalized term.
    Term(String),
    /// Show nothing. Used when no shard covers the term's leading character.
    ForcedEmpty,
}

/// Filters `entries` to those whose id starts with the normalized `search_term`.
///
/// The empty term matches nothing.
pub fn filter(entries: &[ResultEntry], search_term: &str) -> FilterOutcome {
    filter_query(entries, &FilterQuery::Term(search_term.to_string()))
}

pub fn filter_query(entries: &[ResultEntry], query: &FilterQuery) -> FilterOutcome {
    let needle = match query {
        FilterQuery::Term(term) => normalize_term(term),
        FilterQuery::ForcedEmpty => return FilterOutcome::default(),
    };
    if needle.is_empty() {
        return FilterOutcome::default();
    }

    let mut outcome = FilterOutcome::default();
    for (pos, entry) in entries.iter().enumerate() {
        if entry.id.starts_with(&needle) {
            outcome.visible_ids.insert(entry.id.clone());
            outcome.visible.push(pos);
            outcome.match_count += 1;
        }
    }

    tracing::trace!(
        "Filtered {} entries for '{}': {} matches",
        entries.len(),
        needle,
        outcome.match_count
    );
    outcome
}
