//! MCP server exposing documentation search over stdio.

use crate::config::Config;
use crate::context::DocsContext;
use crate::tools::{
    ListCategoriesRequest, OpenDocsRequest, SearchRequest, format_opened, handle_list_categories,
    handle_open_docs, handle_search,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// State shared across tool calls.
#[derive(Debug)]
pub struct ServerState {
    config: Config,
    docs: RwLock<Option<DocsContext>>,
}

impl ServerState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            docs: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn docs(&self) -> Option<DocsContext> {
        self.docs.read().await.clone()
    }

    /// Replace the open site, returning the previous one.
    pub async fn set_docs(&self, docs: DocsContext) -> Option<DocsContext> {
        self.docs.write().await.replace(docs)
    }

    async fn require_docs(&self) -> Result<DocsContext, String> {
        self.docs().await.ok_or_else(|| {
            "No documentation open. Use open_docs with the path to Doxygen HTML output first."
                .to_string()
        })
    }
}

/// MCP server for Doxygen documentation search
#[derive(Clone)]
pub struct SearchServer {
    state: Arc<ServerState>,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for SearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl SearchServer {
    pub fn new(config: Config) -> Self {
        Self {
            state: Arc::new(ServerState::new(config)),
            tool_router: Self::tool_router(),
        }
    }

    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    /// Open `path` at startup, logging instead of failing.
    pub async fn preload(&self, path: &str) {
        match DocsContext::open(path, self.state.config()).await {
            Ok(docs) => {
                tracing::info!("Opened documentation at {}", docs.search_dir().display());
                self.state.set_docs(docs).await;
            }
            Err(e) => tracing::warn!("Could not open documentation at {}: {:#}", path, e),
        }
    }

    #[tool(
        description = "Open a Doxygen-generated documentation site for searching. Accepts the HTML output directory, its search/ directory, or a project directory containing the output."
    )]
    async fn open_docs(
        &self,
        Parameters(request): Parameters<OpenDocsRequest>,
    ) -> std::result::Result<String, String> {
        let docs = handle_open_docs(self.state.config(), request).await?;
        let previous = self.state.set_docs(docs.clone()).await;
        Ok(format_opened(&docs, previous.as_ref()))
    }

    #[tool(
        description = "List the search categories (All, Classes, Functions, ...) of the open documentation with their shard counts."
    )]
    async fn list_categories(
        &self,
        Parameters(request): Parameters<ListCategoriesRequest>,
    ) -> std::result::Result<String, String> {
        let docs = self.state.require_docs().await?;
        handle_list_categories(&docs, request)
    }

    #[tool(
        description = "Search the open documentation by name prefix, the way the site's search box does. Optionally restrict to one category.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        let docs = self.state.require_docs().await?;
        handle_search(&docs, request).await
    }
}

#[tool_handler]
impl ServerHandler for SearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "doxsearch: prefix search over Doxygen documentation. \
                 Use open_docs to select a site unless one was given on startup, \
                 then list_categories and search."
                    .to_string(),
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this sets `inline_subschemas = true` so
/// optional fields render as plain inputs instead of `$ref` patterns.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => object,
        other => {
            tracing::error!("Schema serialization produced a non-object value: {:?}", other);
            JsonObject::new()
        }
    };

    Arc::new(object)
}
