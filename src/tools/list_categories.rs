use crate::context::DocsContext;
use crate::format::format_categories;
use rmcp::schemars;
use serde::Deserialize;

/// Parameters for the list_categories tool
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListCategoriesRequest {}

/// List the search categories of the open documentation.
pub fn handle_list_categories(
    docs: &DocsContext,
    _request: ListCategoriesRequest,
) -> Result<String, String> {
    Ok(format_categories(docs.index()))
}
