//! Prefix search over the open documentation.

use crate::context::DocsContext;
use crate::format::{DEFAULT_LIMIT, format_results};
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Search term; matched as a prefix of result names
    pub query: String,
    /// Category name or label (e.g. "classes", "Functions"). Defaults to all.
    #[serde(default)]
    pub category: Option<String>,
    /// Maximum number of results to return (default: 20)
    #[serde(default = "default_limit")]
    pub limit: Option<usize>,
}

fn default_limit() -> Option<usize> {
    Some(DEFAULT_LIMIT)
}

/// Run one search and render it as text.
pub async fn handle_search(docs: &DocsContext, request: SearchRequest) -> Result<String, String> {
    let index = docs.index();
    let category = match request.category.as_deref() {
        Some(name) => index.category_by_name(name).map_err(|e| e.to_string())?,
        None => index.default_category(),
    };

    let result = docs.query().run(&request.query, category).await;
    tracing::debug!(
        "search '{}' in '{}': {} matches",
        request.query,
        category.name,
        result.outcome.match_count
    );

    let limit = request.limit.unwrap_or(DEFAULT_LIMIT);
    Ok(format_results(&result, &category.label, limit))
}
