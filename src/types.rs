use crate::search::normalize::normalize_id;
use ahash::AHashSet;
use serde::Serialize;

/// One link target of a search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// Link relative to the results page.
    pub url: String,
    /// Whether the link opens in the parent frame rather than a new one.
    pub is_parent_frame: bool,
    /// Enclosing scope shown next to the result (`ns::Class`, file name, ...).
    pub scope_label: String,
}

/// A row of the result list: a label with one target (single result) or several
/// (grouped result).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEntry {
    pub id: String,
    pub label: String,
    pub targets: Vec<Target>,
}

impl ResultEntry {
    /// Create an entry whose id is derived from its label.
    pub fn new(label: impl Into<String>, targets: Vec<Target>) -> Self {
        let label = label.into();
        Self {
            id: normalize_id(&label),
            label,
            targets,
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.targets.len() > 1
    }
}

/// Result of filtering a result list against a search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Ids of the rows to show.
    pub visible_ids: AHashSet<String>,
    /// Positions of the visible rows, in insertion order.
    pub visible: Vec<usize>,
    /// Number of matching rows. Zero drives the "no matches" indicator.
    pub match_count: usize,
}

impl FilterOutcome {
    pub fn is_empty(&self) -> bool {
        self.match_count == 0
    }

    /// First visible row at or after `from`.
    pub fn next_visible(&self, from: usize) -> Option<usize> {
        let at = self.visible.partition_point(|&pos| pos < from);
        self.visible.get(at).copied()
    }

    /// Last visible row at or before `from`.
    pub fn prev_visible(&self, from: usize) -> Option<usize> {
        let at = self.visible.partition_point(|&pos| pos <= from);
        at.checked_sub(1).map(|i| self.visible[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn outcome(visible: &[usize]) -> FilterOutcome {
        FilterOutcome {
            visible: visible.to_vec(),
            match_count: visible.len(),
            ..FilterOutcome::default()
        }
    }

    #[test]
    fn test_entry_id_from_label() {
        let entry = ResultEntry::new("Foo Bar", vec![]);
        check!(entry.id == "foo_20bar");
        check!(entry.label == "Foo Bar");
        check!(!entry.is_grouped());
    }

    #[test]
    fn test_next_visible() {
        let o = outcome(&[1, 4, 7]);
        check!(o.next_visible(0) == Some(1));
        check!(o.next_visible(1) == Some(1));
        check!(o.next_visible(2) == Some(4));
        check!(o.next_visible(8) == None);
    }

    #[test]
    fn test_prev_visible() {
        let o = outcome(&[1, 4, 7]);
        check!(o.prev_visible(0) == None);
        check!(o.prev_visible(4) == Some(4));
        check!(o.prev_visible(6) == Some(4));
        check!(o.prev_visible(100) == Some(7));
    }

    #[test]
    fn test_empty_outcome() {
        let o = FilterOutcome::default();
        check!(o.is_empty());
        check!(o.next_visible(0) == None);
        check!(o.prev_visible(0) == None);
    }
}
