//! Plain-text rendering of search results and category tables, shared by the CLI
//! and the MCP tools.

use crate::search::{QueryResult, ResultStatus, SearchIndex};
use crate::types::{ResultEntry, Target};
use std::fmt::Write as _;

/// Default number of rows shown before the listing is cut short.
pub const DEFAULT_LIMIT: usize = 20;

/// Render the visible rows of `result`, at most `limit` of them.
pub fn format_results(result: &QueryResult, category_label: &str, limit: usize) -> String {
    let mut output = String::new();
    let term = result.term.trim();

    if let ResultStatus::Unavailable(e) = &result.status {
        let _ = writeln!(output, "Results for '{}' are unavailable: {}", term, e);
        return output;
    }

    let count = result.outcome.match_count;
    if count == 0 {
        let _ = writeln!(output, "No matches for '{}' in {}.", term, category_label);
        return output;
    }

    let _ = writeln!(
        output,
        "Found {} {} for '{}' in {}:\n",
        count,
        if count == 1 { "match" } else { "matches" },
        term,
        category_label
    );
    for entry in result.matches().take(limit) {
        format_entry(&mut output, entry);
    }
    if count > limit {
        let _ = writeln!(output, "  ... and {} more", count - limit);
    }
    output
}

fn format_entry(output: &mut String, entry: &ResultEntry) {
    match entry.targets.as_slice() {
        [target] => {
            let _ = write!(output, "  • {}", entry.label);
            format_target(output, target);
        }
        targets => {
            let _ = writeln!(output, "  • {} ({} results)", entry.label, targets.len());
            for target in targets {
                output.push_str("      -");
                format_target(output, target);
            }
        }
    }
}

fn format_target(output: &mut String, target: &Target) {
    if !target.scope_label.is_empty() {
        let _ = write!(output, " [{}]", target.scope_label);
    }
    let _ = writeln!(output, " {}", target.url);
}

/// List every category with its shard count.
pub fn format_categories(index: &SearchIndex) -> String {
    let mut output = format!("Search categories ({}):\n", index.categories().len());
    for category in index.categories() {
        let _ = writeln!(
            output,
            "  {:>2}. {} ({}): {} shards",
            category.index,
            category.label,
            category.name,
            category.shard_count()
        );
    }
    output
}
