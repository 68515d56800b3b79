use anyhow::{Context, anyhow};
use clap::Parser;
use doxsearch::cli::{Cli, Commands, SettingsAction};
use doxsearch::config::Config;
use doxsearch::context::DocsContext;
use doxsearch::format::{format_categories, format_results};
use doxsearch::server::SearchServer;
use doxsearch::session::SEARCH_GROUP_KEY;
use doxsearch::settings::Settings;
use doxsearch::tracing::LogFormat;
use rmcp::{ServiceExt, transport::stdio};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    doxsearch::tracing::init_with(if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    });

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Search {
            term,
            docs,
            category,
            limit,
        } => {
            let docs = open_docs(docs, &config).await?;
            let settings = Settings::from_config(&config);
            let index = docs.index();
            let category = match category {
                Some(name) => index.category_by_name(&name)?,
                None => index
                    .category_by_label(&settings.read_setting(SEARCH_GROUP_KEY, ""))
                    .unwrap_or_else(|| index.default_category()),
            };
            let result = docs.query().run(&term, category).await;
            print!("{}", format_results(&result, &category.label, limit));
        }
        Commands::Categories { docs } => {
            let docs = open_docs(docs, &config).await?;
            print!("{}", format_categories(docs.index()));
        }
        Commands::Serve { docs } => {
            tracing::info!("Starting doxsearch MCP server");
            let server = SearchServer::new(config.clone());
            if let Some(path) = docs.or_else(|| config_docs(&config)) {
                server.preload(&path).await;
            }

            let service = server.serve(stdio()).await.inspect_err(|e| {
                tracing::error!("Error serving MCP server: {:?}", e);
            })?;
            service.waiting().await?;
        }
        Commands::Settings { action } => {
            let mut settings = Settings::from_config(&config);
            match action {
                SettingsAction::Get { key, default } => {
                    println!("{}", settings.read_setting(&key, &default));
                }
                SettingsAction::Set { key, value, days } => {
                    settings
                        .write_setting(&key, &value, days)
                        .with_context(|| format!("Failed to save setting '{}'", key))?;
                }
                SettingsAction::Erase { key } => {
                    settings
                        .erase_setting(&key)
                        .with_context(|| format!("Failed to erase setting '{}'", key))?;
                }
            }
        }
    }

    Ok(())
}

fn config_docs(config: &Config) -> Option<String> {
    config.docs.as_ref().map(|path| path.display().to_string())
}

async fn open_docs(flag: Option<String>, config: &Config) -> anyhow::Result<DocsContext> {
    let path = flag.or_else(|| config_docs(config)).ok_or_else(|| {
        anyhow!("No documentation directory given. Pass --docs or set `docs` in the config file.")
    })?;
    DocsContext::open(&path, config).await
}
