//! Locating a generated documentation site and holding its loaded search state.

use crate::config::{Config, expand_tilde};
use crate::error::{IndexError, Result};
use crate::search::{QueryContext, SEARCHDATA_FILE, SearchIndex, ShardStore};
use anyhow::{Context, anyhow};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How deep below the given root to look for a search directory.
const MAX_SEARCH_DEPTH: usize = 5;

/// A documentation site whose search index has been loaded.
#[derive(Debug, Clone)]
pub struct DocsContext {
    /// Directory holding `searchdata.js` and the shard files.
    search_dir: PathBuf,
    query: QueryContext,
}

impl DocsContext {
    /// Resolve `path` to a search directory and load its index.
    pub async fn open(path: &str, config: &Config) -> Result<Self> {
        let search_dir = find_search_dir(path)?;
        let index = SearchIndex::open(&search_dir).await?;
        let store = ShardStore::from_dir(&search_dir, config.load_timeout());
        Ok(Self {
            query: QueryContext::new(Arc::new(index), Arc::new(store)),
            search_dir,
        })
    }

    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }

    pub fn query(&self) -> &QueryContext {
        &self.query
    }

    pub fn index(&self) -> &Arc<SearchIndex> {
        self.query.index()
    }

    pub fn store(&self) -> &Arc<ShardStore> {
        self.query.store()
    }
}

/// Find the directory containing `searchdata.js`.
///
/// Accepts the search directory itself, the HTML output directory (`html/search`),
/// or any ancestor within a few levels; the shallowest match wins.
pub fn find_search_dir(path: &str) -> Result<PathBuf> {
    let expanded = PathBuf::from(expand_tilde(path).as_ref());
    let root = std::fs::canonicalize(&expanded)
        .with_context(|| format!("Failed to resolve path '{}'", path))?;

    if !root.is_dir() {
        return Err(anyhow!("Path is not a directory: {}", root.display()));
    }

    for candidate in [root.clone(), root.join("search")] {
        if candidate.join(SEARCHDATA_FILE).is_file() {
            return Ok(candidate);
        }
    }

    // Generated output is often gitignored, so walk without the standard filters.
    let mut found: Vec<PathBuf> = WalkBuilder::new(&root)
        .standard_filters(false)
        .max_depth(Some(MAX_SEARCH_DEPTH))
        .build()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name() == SEARCHDATA_FILE)
        .filter_map(|e| e.path().parent().map(Path::to_path_buf))
        .collect();
    found.sort_by_key(|dir| (dir.components().count(), dir.clone()));

    let search_dir = found
        .into_iter()
        .next()
        .ok_or_else(|| IndexError::NotFound { path: root.clone() })?;
    tracing::debug!("Found search index at {}", search_dir.display());
    Ok(search_dir)
}
