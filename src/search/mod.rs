//! Incremental prefix search over a sharded, lazily loaded index.
//!
//! This module provides the index model, shard location, shard decoding and caching,
//! and prefix filtering of loaded result rows.

// Module declarations
pub mod category;
pub mod filter;
pub mod index;
pub mod literal;
pub mod locator;
pub mod normalize;
pub mod query;
pub mod shard;
pub mod store;

// Public re-exports (used via lib.rs)
pub use category::SearchCategory;
pub use filter::{FilterQuery, filter, filter_query};
pub use index::{SEARCHDATA_FILE, SearchIndex};
pub use locator::{LeadingKey, ShardRef, locate};
pub use normalize::{normalize_id, normalize_term};
pub use query::{QueryContext, QueryResult, ResultStatus};
pub use store::{FsShardSource, LoadedShard, ShardSource, ShardStore};
