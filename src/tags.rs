//! Safe / unsafe tag classification.
//!
//! The two lists are plain text, one Exiv2-style tag name per line. They are
//! read once at startup into a [`TagSets`] value that is passed by reference
//! to everything that needs it and never changes afterwards.

use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::path::Path;

use crate::store::MetadataStore;

/// File name of the safe tag list inside a tags directory.
pub const SAFE_TAGS_FILE: &str = "safe_tags.txt";
/// File name of the unsafe tag list inside a tags directory.
pub const UNSAFE_TAGS_FILE: &str = "unsafe_tags.txt";

const BUILTIN_SAFE: &str = include_str!("../data/safe_tags.txt");
const BUILTIN_UNSAFE: &str = include_str!("../data/unsafe_tags.txt");

/// How a tag is treated during anonymization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Safe,
    Unsafe,
    Unknown,
}

/// The immutable SAFE and UNSAFE tag sets.
#[derive(Debug, Clone)]
pub struct TagSets {
    safe: BTreeSet<String>,
    unsafe_tags: BTreeSet<String>,
}

impl TagSets {
    /// Lists shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_lists(BUILTIN_SAFE, BUILTIN_UNSAFE)
    }

    /// Read `safe_tags.txt` and `unsafe_tags.txt` from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let safe_path = dir.join(SAFE_TAGS_FILE);
        let unsafe_path = dir.join(UNSAFE_TAGS_FILE);

        let safe = std::fs::read_to_string(&safe_path)
            .with_context(|| format!("Failed to read {}", safe_path.display()))?;
        let unsafe_list = std::fs::read_to_string(&unsafe_path)
            .with_context(|| format!("Failed to read {}", unsafe_path.display()))?;

        let sets = Self::from_lists(&safe, &unsafe_list)?;
        log::debug!(
            "Loaded {} safe and {} unsafe tags from {}",
            sets.safe.len(),
            sets.unsafe_tags.len(),
            dir.display()
        );
        Ok(sets)
    }

    /// Parse two newline-delimited lists. Trailing whitespace is stripped and
    /// blank lines are skipped. A tag may not appear in both lists.
    pub fn from_lists(safe: &str, unsafe_list: &str) -> Result<Self> {
        let safe = parse_list(safe);
        let unsafe_tags = parse_list(unsafe_list);

        if let Some(tag) = safe.intersection(&unsafe_tags).next() {
            bail!("Tag {tag} is listed as both safe and unsafe");
        }

        Ok(Self { safe, unsafe_tags })
    }

    pub fn classify(&self, tag: &str) -> Classification {
        if self.unsafe_tags.contains(tag) {
            Classification::Unsafe
        } else if self.safe.contains(tag) {
            Classification::Safe
        } else {
            Classification::Unknown
        }
    }

    pub fn is_unsafe(&self, tag: &str) -> bool {
        self.unsafe_tags.contains(tag)
    }

    pub fn safe_tags(&self) -> impl Iterator<Item = &str> {
        self.safe.iter().map(String::as_str)
    }

    pub fn unsafe_tags(&self) -> impl Iterator<Item = &str> {
        self.unsafe_tags.iter().map(String::as_str)
    }

    /// Unsafe tags present in `store`, in the store's key order.
    pub fn unsafe_tags_present(&self, store: &dyn MetadataStore) -> Vec<String> {
        store
            .keys()
            .into_iter()
            .filter(|key| self.is_unsafe(key))
            .collect()
    }

    /// Delete every unsafe tag from `store`. Returns the tags that were removed.
    ///
    /// The store is not flushed.
    pub fn remove_unsafe_tags(&self, store: &mut dyn MetadataStore) -> Vec<String> {
        self.remove_unsafe_tags_retaining(store, &[])
    }

    /// Like [`remove_unsafe_tags`](Self::remove_unsafe_tags) but leaves the
    /// tags in `keep` alone.
    pub fn remove_unsafe_tags_retaining(
        &self,
        store: &mut dyn MetadataStore,
        keep: &[String],
    ) -> Vec<String> {
        let mut removed = Vec::new();
        for tag in self.unsafe_tags() {
            if keep.iter().any(|k| k == tag) {
                continue;
            }
            if store.delete(tag).is_removed() {
                log::debug!("  Removed {tag}");
                removed.push(tag.to_string());
            }
        }
        removed
    }
}

fn parse_list(text: &str) -> BTreeSet<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
