//! Error handling types and utilities.

use crate::search::literal::LiteralError;
use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for doxsearch operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods throughout the codebase.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when the search index (`searchdata.js`) cannot be used.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    /// No `searchdata.js` could be found under the given directory.
    #[error("No searchdata.js found under {} (is this Doxygen HTML output with SEARCHENGINE enabled?)", .path.display())]
    NotFound { path: PathBuf },
    /// The index file was read but a required table is missing or malformed.
    #[error("Malformed search index: {0}")]
    Malformed(String),
    /// A category was requested that the index does not define.
    #[error("Unknown search category '{name}'{}", format_suggestions(.suggestions))]
    UnknownCategory {
        name: String,
        suggestions: Vec<String>,
    },
}

/// Error returned when a shard cannot be fetched or decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShardError {
    /// Reading the shard file failed.
    #[error("Failed to read shard {file}: {reason}")]
    Io { file: String, reason: String },
    /// The shard did not finish loading within the configured timeout.
    #[error("Timed out loading shard {file} after {millis}ms")]
    Timeout { file: String, millis: u64 },
    /// The shard file was read but its data table was malformed.
    #[error("Malformed shard {file}: {reason}")]
    Malformed {
        file: String,
        #[source]
        reason: DecodeError,
    },
}

/// Why the `searchData` table of a shard file could not be decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error(transparent)]
    Literal(#[from] LiteralError),
    #[error("no `{0}` assignment")]
    MissingGlobal(&'static str),
    #[error("searchData is not an array")]
    NotArray,
    #[error("row {row}: {problem}")]
    Row { row: usize, problem: RowError },
}

/// A single `searchData` row with an unexpected shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("expected [id, record]")]
    Shape,
    #[error("record is not an array")]
    RecordNotArray,
    #[error("record is empty")]
    EmptyRecord,
    #[error("label is not a string")]
    LabelNotString,
    #[error("'{0}' has no targets")]
    NoTargets(String),
    #[error("expected [url, parent_frame, scope]")]
    TargetShape,
    #[error("url is not a string")]
    UrlNotString,
    #[error("unexpected parent_frame value {0}")]
    ParentFrame(String),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(". Did you mean: {}?", suggestions.join(", "))
    }
}
