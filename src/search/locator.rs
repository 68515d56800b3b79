//! Maps a search term to the shard that covers its leading character.

use super::category::SearchCategory;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

const HIGH_SURROGATES: std::ops::RangeInclusive<u16> = 0xD800..=0xDBFF;

/// The one or two UTF-16 code units a shard is keyed by.
///
/// A supplementary-plane character is two code units (a surrogate pair) and must be
/// looked up as a pair, never as its lone high surrogate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeadingKey {
    units: [u16; 2],
    len: u8,
}

impl LeadingKey {
    /// Key for the first character of an already-normalized term.
    pub fn of(term: &str) -> Option<Self> {
        let mut units = term.encode_utf16();
        let first = units.next()?;
        Some(Self::from_units(first, units.next()))
    }

    /// Key for raw UTF-16 input, which may contain unpaired surrogates.
    ///
    /// A high surrogate followed by any unit keys on both units. A lone trailing high
    /// surrogate keys on itself.
    pub fn from_utf16(units: &[u16]) -> Option<Self> {
        let (&first, rest) = units.split_first()?;
        let first = lowercase_unit(first);
        Some(Self::from_units(first, rest.first().copied()))
    }

    fn from_units(first: u16, second: Option<u16>) -> Self {
        match second {
            Some(second) if HIGH_SURROGATES.contains(&first) => Self {
                units: [first, second],
                len: 2,
            },
            _ => Self {
                units: [first, 0],
                len: 1,
            },
        }
    }

    pub fn units(&self) -> &[u16] {
        &self.units[..usize::from(self.len)]
    }

    pub fn is_pair(&self) -> bool {
        self.len == 2
    }
}

impl fmt::Display for LeadingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf16_lossy(self.units()))
    }
}

/// Lowercases a BMP code unit when it lowercases to a single unit.
fn lowercase_unit(unit: u16) -> u16 {
    let Some(c) = char::from_u32(u32::from(unit)) else {
        return unit;
    };
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => u16::try_from(u32::from(l)).unwrap_or(unit),
        _ => unit,
    }
}

/// Reference to one shard file of a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ShardRef {
    pub category: String,
    pub id: usize,
}

impl ShardRef {
    pub fn new(category: impl Into<String>, id: usize) -> Self {
        Self {
            category: category.into(),
            id,
        }
    }

    /// Shard id in lowercase hex, unpadded.
    pub fn hex(&self) -> String {
        format!("{:x}", self.id)
    }

    /// `<category>_<hex>.js`
    pub fn file_name(&self) -> String {
        format!("{}_{}.js", self.category, self.hex())
    }

    /// Joins the file name onto a results path string (`"search/"` style, trailing
    /// separator included by the caller).
    pub fn url(&self, results_path: &str) -> String {
        format!("{}{}", results_path, self.file_name())
    }

    /// Location of the shard inside a results directory.
    pub fn path_in(&self, results_dir: &Path) -> PathBuf {
        results_dir.join(self.file_name())
    }
}

impl fmt::Display for ShardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Finds the shard of `category` covering the first character of `search_term`.
///
/// The term is trimmed and lowercased first. `None` means no shard covers this
/// prefix and the caller must show an empty result set.
pub fn locate(search_term: &str, category: &SearchCategory) -> Option<ShardRef> {
    let term = search_term.trim().to_lowercase();
    let key = LeadingKey::of(&term)?;
    locate_key(key, category)
}

/// [`locate`] for an already computed key.
pub fn locate_key(key: LeadingKey, category: &SearchCategory) -> Option<ShardRef> {
    let id = category.shard_for(&key)?;
    Some(ShardRef::new(category.name.clone(), id))
}
