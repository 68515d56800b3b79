//! The category table of a generated search index (`searchdata.js`).

use super::category::SearchCategory;
use super::literal::parse_assignments;
use crate::error::{IndexError, Result};
use anyhow::Context;
use rapidfuzz::distance::jaro_winkler;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// File holding the category tables.
pub const SEARCHDATA_FILE: &str = "searchdata.js";

const CONTENT_TABLE: &str = "indexSectionsWithContent";
const NAME_TABLE: &str = "indexSectionNames";
const LABEL_TABLE: &str = "indexSectionLabels";

/// Minimum similarity for a category name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.7;

/// Ordered categories of one documentation site plus where their shards live.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    categories: Vec<SearchCategory>,
    results_dir: PathBuf,
}

impl SearchIndex {
    /// An index needs at least one category to have a default selection.
    pub fn new(
        categories: Vec<SearchCategory>,
        results_dir: impl Into<PathBuf>,
    ) -> std::result::Result<Self, IndexError> {
        if categories.is_empty() {
            return Err(IndexError::Malformed("no categories".to_string()));
        }
        Ok(Self {
            categories,
            results_dir: results_dir.into(),
        })
    }

    /// Read `searchdata.js` from a search directory.
    pub async fn open(search_dir: &Path) -> Result<Self> {
        let path = search_dir.join(SEARCHDATA_FILE);
        let source = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let index = Self::from_source(&source, search_dir)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        tracing::info!(
            "Loaded search index from {}: {} categories",
            search_dir.display(),
            index.categories.len()
        );
        Ok(index)
    }

    /// Build from the text of `searchdata.js`.
    pub fn from_source(source: &str, results_dir: impl Into<PathBuf>) -> Result<Self> {
        let assignments =
            parse_assignments(source).context("Failed to parse search index tables")?;
        let table = |name: &str| {
            assignments
                .iter()
                .find(|(found, _)| found == name)
                .map(|(_, value)| value)
        };

        let content = table(CONTENT_TABLE)
            .and_then(Value::as_object)
            .ok_or_else(|| IndexError::Malformed(format!("missing `{}`", CONTENT_TABLE)))?;
        let names = table(NAME_TABLE)
            .and_then(Value::as_object)
            .ok_or_else(|| IndexError::Malformed(format!("missing `{}`", NAME_TABLE)))?;
        let labels = table(LABEL_TABLE).and_then(Value::as_object);

        let mut keyed: Vec<(usize, &String)> = names
            .keys()
            .map(|key| {
                key.parse::<usize>()
                    .map(|index| (index, key))
                    .map_err(|_| IndexError::Malformed(format!("non-numeric category key '{}'", key)))
            })
            .collect::<std::result::Result<_, _>>()?;
        keyed.sort_unstable_by_key(|(index, _)| *index);

        let mut categories = Vec::with_capacity(keyed.len());
        for (position, (_, key)) in keyed.into_iter().enumerate() {
            let name = string_at(names, key)
                .ok_or_else(|| IndexError::Malformed(format!("category {} has no name", key)))?;
            let leading = string_at(content, key).unwrap_or_default();
            let label = labels
                .and_then(|labels| string_at(labels, key))
                .unwrap_or(name);
            categories.push(SearchCategory::new(position, name, label, leading));
        }

        Ok(Self::new(categories, results_dir)?)
    }

    pub fn categories(&self) -> &[SearchCategory] {
        &self.categories
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn category(&self, index: usize) -> Option<&SearchCategory> {
        self.categories.get(index)
    }

    /// The first category, conventionally "all".
    pub fn default_category(&self) -> &SearchCategory {
        // Non-empty since construction.
        &self.categories[0]
    }

    /// Find a category by name or label, ignoring case.
    pub fn category_by_name(&self, name: &str) -> std::result::Result<&SearchCategory, IndexError> {
        let wanted = name.trim();
        if let Some(found) = self.categories.iter().find(|c| {
            c.name.eq_ignore_ascii_case(wanted) || c.label.eq_ignore_ascii_case(wanted)
        }) {
            return Ok(found);
        }

        let lowered = wanted.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .categories
            .iter()
            .map(|c| {
                let score = jaro_winkler::similarity(lowered.chars(), c.name.chars());
                (score, c.name.as_str())
            })
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Err(IndexError::UnknownCategory {
            name: wanted.to_string(),
            suggestions: scored
                .into_iter()
                .take(3)
                .map(|(_, name)| name.to_string())
                .collect(),
        })
    }

    /// Find a category by its display label, as stored in the selection setting.
    pub fn category_by_label(&self, label: &str) -> Option<&SearchCategory> {
        self.categories.iter().find(|c| c.label == label)
    }
}

fn string_at<'a>(table: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    table.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    const SEARCHDATA: &str = r#"var indexSectionsWithContent =
{
  0: "abfmo",
  1: "f",
  2: "m"
};

var indexSectionNames =
{
  0: "all",
  1: "classes",
  2: "functions"
};

var indexSectionLabels =
{
  0: "All",
  1: "Classes",
  2: "Functions"
};
"#;

    #[test]
    fn test_from_source() {
        let_assert!(Ok(index) = SearchIndex::from_source(SEARCHDATA, "search"));
        check!(index.categories().len() == 3);
        check!(index.default_category().name == "all");
        check!(index.default_category().leading == "abfmo");

        let_assert!(Some(functions) = index.category(2));
        check!(functions.label == "Functions");
        check!(functions.index == 2);
        check!(index.results_dir() == Path::new("search"));
    }

    #[test]
    fn test_labels_default_to_names() {
        let source = "var indexSectionsWithContent = {0: 'a'};\nvar indexSectionNames = {0: 'all'};\n";
        let_assert!(Ok(index) = SearchIndex::from_source(source, "search"));
        check!(index.default_category().label == "all");
    }

    #[test]
    fn test_categories_sorted_numerically() {
        let source = "var indexSectionsWithContent = {10: 'x', 2: 'y'};\n\
                      var indexSectionNames = {10: 'late', 2: 'early'};\n";
        let_assert!(Ok(index) = SearchIndex::from_source(source, "search"));
        check!(index.categories()[0].name == "early");
        check!(index.categories()[1].name == "late");
        check!(index.categories()[1].index == 1);
    }

    #[test]
    fn test_missing_tables() {
        check!(SearchIndex::from_source("var x = 1;", "search").is_err());
        check!(SearchIndex::from_source("var indexSectionNames = {};\nvar indexSectionsWithContent = {};\n", "search").is_err());
    }

    #[test]
    fn test_empty_index_is_rejected() {
        let_assert!(Err(IndexError::Malformed(reason)) = SearchIndex::new(Vec::new(), "search"));
        check!(reason == "no categories");

        let source = "var indexSectionsWithContent = {};\nvar indexSectionNames = {};\n";
        let_assert!(Err(err) = SearchIndex::from_source(source, "search"));
        check!(format!("{:#}", err).contains("no categories"));
    }

    #[test]
    fn test_category_by_name() {
        let index = SearchIndex::from_source(SEARCHDATA, "search").unwrap();
        let_assert!(Ok(cat) = index.category_by_name("CLASSES"));
        check!(cat.index == 1);
        let_assert!(Ok(cat) = index.category_by_name("Functions"));
        check!(cat.name == "functions");
    }

    #[test]
    fn test_unknown_category_suggests() {
        let index = SearchIndex::from_source(SEARCHDATA, "search").unwrap();
        let_assert!(Err(IndexError::UnknownCategory { suggestions, .. }) = index.category_by_name("clases"));
        check!(suggestions.first().map(String::as_str) == Some("classes"));
    }

    #[test]
    fn test_category_by_label() {
        let index = SearchIndex::from_source(SEARCHDATA, "search").unwrap();
        check!(index.category_by_label("Classes").map(|c| c.index) == Some(1));
        check!(index.category_by_label("classes").is_none());
    }

    #[tokio::test]
    async fn test_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SEARCHDATA_FILE), SEARCHDATA).unwrap();
        let_assert!(Ok(index) = SearchIndex::open(dir.path()).await);
        check!(index.categories().len() == 3);
    }
}
