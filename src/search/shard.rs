//! Decoding of shard files into result entries.
//!
//! A shard assigns the global `searchData`:
//!
//! ```text
//! var searchData = [
//!   ['raw_id', ['label', ['url', parent_frame, 'scope'], ...]],
//!   ...
//! ];
//! ```
//!
//! The raw id is not used. Ids are rederived from the label so that they follow the
//! same normalization as search terms.

use super::literal::find_assignment;
use super::normalize::unescape_html;
use crate::error::{DecodeError, RowError};
use crate::types::{ResultEntry, Target};
use serde_json::Value;

/// Name of the global a shard file assigns.
pub const SHARD_GLOBAL: &str = "searchData";

/// Parses the text of a shard file.
pub fn decode_shard(source: &str) -> Result<Vec<ResultEntry>, DecodeError> {
    let data = find_assignment(source, SHARD_GLOBAL)?
        .ok_or(DecodeError::MissingGlobal(SHARD_GLOBAL))?;
    decode_entries(&data)
}

/// Converts the decoded `searchData` array into entries.
pub fn decode_entries(data: &Value) -> Result<Vec<ResultEntry>, DecodeError> {
    let rows = data.as_array().ok_or(DecodeError::NotArray)?;

    rows.iter()
        .enumerate()
        .map(|(row, value)| decode_row(value).map_err(|problem| DecodeError::Row { row, problem }))
        .collect()
}

fn decode_row(value: &Value) -> Result<ResultEntry, RowError> {
    let record = match value.as_array().map(Vec::as_slice) {
        Some([_raw_id, record]) => record,
        _ => return Err(RowError::Shape),
    };
    let parts = record.as_array().ok_or(RowError::RecordNotArray)?;
    let (label, targets) = parts.split_first().ok_or(RowError::EmptyRecord)?;
    let label = label.as_str().ok_or(RowError::LabelNotString)?;
    if targets.is_empty() {
        return Err(RowError::NoTargets(label.to_string()));
    }

    let targets = targets
        .iter()
        .map(decode_target)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResultEntry::new(unescape_html(label), targets))
}

fn decode_target(value: &Value) -> Result<Target, RowError> {
    let Some([url, parent, scope]) = value.as_array().map(Vec::as_slice) else {
        return Err(RowError::TargetShape);
    };
    let url = url.as_str().ok_or(RowError::UrlNotString)?;
    let is_parent_frame = match parent {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::Null => false,
        other => return Err(RowError::ParentFrame(other.to_string())),
    };
    let scope = scope.as_str().unwrap_or_default();

    Ok(Target {
        url: url.to_string(),
        is_parent_frame,
        scope_label: unescape_html(scope),
    })
}
