//! Search categories and their leading-key tables.

use super::locator::LeadingKey;
use ahash::AHashMap;
use serde::Serialize;

/// A named section of the search index (`all`, `classes`, `functions`, ...).
#[derive(Debug, Clone, Serialize)]
pub struct SearchCategory {
    /// Position in the category list; also the selection index.
    pub index: usize,
    /// File stem of this category's shards.
    pub name: String,
    /// Display label.
    pub label: String,
    /// The leading characters that have a shard, in shard-id order.
    pub leading: String,
    #[serde(skip)]
    keys: AHashMap<LeadingKey, usize>,
}

impl SearchCategory {
    /// Build a category from its leading-character string. The n-th character (by
    /// Unicode scalar, so a surrogate pair counts once) is covered by shard `n`.
    ///
    /// This deliberately differs from a JavaScript `indexOf` over the same string, which
    /// counts UTF-16 code units: Doxygen numbers shard files one per leading character,
    /// so after a supplementary-plane character only the scalar position names an
    /// existing file.
    pub fn new(
        index: usize,
        name: impl Into<String>,
        label: impl Into<String>,
        leading: impl Into<String>,
    ) -> Self {
        let leading = leading.into();
        let mut keys = AHashMap::with_capacity(leading.len());
        let mut buf = [0u8; 4];
        for (shard, c) in leading.chars().enumerate() {
            let Some(key) = LeadingKey::of(c.encode_utf8(&mut buf)) else {
                continue;
            };
            // First occurrence wins, matching a left-to-right scan.
            keys.entry(key).or_insert(shard);
        }

        Self {
            index,
            name: name.into(),
            label: label.into(),
            leading,
            keys,
        }
    }

    /// Shard id covering `key`, if any.
    pub fn shard_for(&self, key: &LeadingKey) -> Option<usize> {
        self.keys.get(key).copied()
    }

    /// Number of shards in this category.
    pub fn shard_count(&self) -> usize {
        self.leading.chars().count()
    }
}
