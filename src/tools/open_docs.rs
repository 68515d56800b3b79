//! Point the server at a generated documentation site.

use crate::config::Config;
use crate::context::DocsContext;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

/// Parameters for the open_docs tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct OpenDocsRequest {
    /// Doxygen HTML output directory, its `search/` directory, or a project root above it
    pub path: String,
}

/// Load the search index under `request.path`.
pub async fn handle_open_docs(
    config: &Config,
    request: OpenDocsRequest,
) -> Result<DocsContext, String> {
    DocsContext::open(&request.path, config)
        .await
        .map_err(|e| format!("Failed to open documentation: {:#}", e))
}

/// Summary shown after a site was opened.
pub fn format_opened(docs: &DocsContext, previous: Option<&DocsContext>) -> String {
    let mut response = format!("Documentation opened: {}\n", docs.search_dir().display());
    if let Some(previous) = previous
        && previous.search_dir() != docs.search_dir()
    {
        let _ = writeln!(response, "Replaced: {}", previous.search_dir().display());
    }

    let labels: Vec<&str> = docs
        .index()
        .categories()
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    let _ = writeln!(response, "\nCategories: {}", labels.join(", "));
    response
}
