pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod layout;
pub mod search;
pub mod server;
pub mod session;
pub mod settings;
pub mod tools;
pub mod tracing;
pub mod types;

pub use config::Config;
pub use context::DocsContext;
pub use error::{IndexError, Result, ShardError};
pub use layout::{PageLayout, SidebarLayout};
pub use search::{QueryContext, SearchIndex, ShardStore};
pub use session::{SearchSession, SessionDriver};
pub use settings::Settings;
pub use types::{FilterOutcome, ResultEntry, Target};
