use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "doxsearch", version)]
#[command(about = "Search Doxygen-generated documentation from the terminal or over MCP", long_about = None)]
pub struct Cli {
    /// Config file (default: the platform config dir, `doxsearch/config.toml`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log as JSON lines instead of compact text
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Prefix search, as the site's search box does it
    Search {
        term: String,
        /// Documentation directory (overrides `docs` in the config)
        #[arg(short, long)]
        docs: Option<String>,
        /// Category name or label; defaults to the saved selection, then "all"
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
    /// List the search categories
    Categories {
        #[arg(short, long)]
        docs: Option<String>,
    },
    /// Run the MCP server on stdio
    Serve {
        /// Documentation to open on startup
        #[arg(short, long)]
        docs: Option<String>,
    },
    /// Read or change persisted panel settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    Get {
        key: String,
        #[arg(long, default_value = "")]
        default: String,
    },
    Set {
        key: String,
        value: String,
        /// Days to keep the value; 0 keeps it for this run only, negative erases
        #[arg(long, default_value_t = crate::settings::DEFAULT_TTL_DAYS, allow_negative_numbers = true)]
        days: i64,
    },
    Erase {
        key: String,
    },
}
