//! One-shot queries: locate, load, and filter in a single call.
//!
//! The interactive path goes through [`crate::session`]; this is what the CLI and the
//! MCP server use when they already have the full term.

use super::category::SearchCategory;
use super::filter::{FilterQuery, filter_query};
use super::index::SearchIndex;
use super::locator::{ShardRef, locate};
use super::store::{LoadedShard, ShardStore};
use crate::error::ShardError;
use crate::types::{FilterOutcome, ResultEntry};
use std::sync::Arc;

/// Whether the rows behind a result could be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultStatus {
    Ready,
    /// The shard failed to load; the result is empty.
    Unavailable(ShardError),
}

/// Outcome of a one-shot query.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub term: String,
    pub category: String,
    /// The shard searched, or `None` when no shard covers the term.
    pub shard: Option<ShardRef>,
    /// Rows of the searched shard, in file order.
    pub entries: Arc<[ResultEntry]>,
    pub outcome: FilterOutcome,
    pub status: ResultStatus,
}

impl QueryResult {
    /// Filter the rows of `shard` for `term`.
    ///
    /// `shard` is `None` when no shard covers the term, which forces an empty result
    /// instead of leaving stale rows visible. A failed load also filters as empty
    /// and is reported through [`ResultStatus::Unavailable`].
    pub fn from_loaded(
        term: &str,
        category: &SearchCategory,
        shard: Option<(ShardRef, &LoadedShard)>,
    ) -> Self {
        let empty = || Arc::<[ResultEntry]>::from(Vec::new());
        let (shard, entries, status, query) = match shard {
            None => (None, empty(), ResultStatus::Ready, FilterQuery::ForcedEmpty),
            Some((shard, Ok(entries))) => (
                Some(shard),
                Arc::clone(entries),
                ResultStatus::Ready,
                FilterQuery::Term(term.to_string()),
            ),
            Some((shard, Err(e))) => (
                Some(shard),
                empty(),
                ResultStatus::Unavailable(e.clone()),
                FilterQuery::Term(term.to_string()),
            ),
        };
        let outcome = filter_query(&entries, &query);

        Self {
            term: term.to_string(),
            category: category.name.clone(),
            shard,
            entries,
            outcome,
            status,
        }
    }

    /// Visible rows in display order.
    pub fn matches(&self) -> impl Iterator<Item = &ResultEntry> {
        self.outcome.visible.iter().map(|&pos| &self.entries[pos])
    }

    pub fn is_available(&self) -> bool {
        self.status == ResultStatus::Ready
    }
}

/// Shared search context for one documentation site.
#[derive(Debug, Clone)]
pub struct QueryContext {
    index: Arc<SearchIndex>,
    store: Arc<ShardStore>,
}

impl QueryContext {
    pub fn new(index: Arc<SearchIndex>, store: Arc<ShardStore>) -> Self {
        Self { index, store }
    }

    pub fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }

    pub fn store(&self) -> &Arc<ShardStore> {
        &self.store
    }

    /// Search `category` for `term`.
    pub async fn run(&self, term: &str, category: &SearchCategory) -> QueryResult {
        let Some(shard) = locate(term, category) else {
            tracing::debug!("No shard in '{}' covers '{}'", category.name, term.trim());
            return QueryResult::from_loaded(term, category, None);
        };
        let loaded = self.store.load(&shard).await;
        QueryResult::from_loaded(term, category, Some((shard, &loaded)))
    }
}
