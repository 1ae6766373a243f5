//! The key-value view of one file's metadata.
//!
//! Everything above this module talks to metadata through [`MetadataStore`].
//! [`MemoryStore`] backs tests and dry runs; [`crate::exif::ExifFile`] backs
//! real image files.

use anyhow::{Result, bail};

/// Outcome of deleting a tag. Absence is an expected case, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    NotPresent,
}

impl Removal {
    pub fn is_removed(self) -> bool {
        self == Self::Removed
    }
}

/// Metadata of one image, keyed by Exiv2-style tag name
/// (e.g. `Exif.GPSInfo.GPSLatitude`).
///
/// Changes are held in memory until [`flush`](MetadataStore::flush).
pub trait MetadataStore {
    fn contains(&self, tag: &str) -> bool;

    /// Textual value of a tag, or `None` if the tag is absent.
    fn get(&self, tag: &str) -> Option<String>;

    /// Set a tag, creating it if needed.
    fn set(&mut self, tag: &str, value: &str) -> Result<()>;

    /// Validate `value` for `tag` without storing it. A `set` with the same
    /// arguments succeeds when this does.
    fn check(&self, _tag: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    /// Delete a tag. Deleting an absent tag is a no-op.
    fn delete(&mut self, tag: &str) -> Removal;

    /// All tag names, in the store's natural order.
    fn keys(&self) -> Vec<String>;

    /// Persist pending changes.
    fn flush(&mut self) -> Result<()>;
}

/// Insertion-ordered in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<(String, String)>,
    flushes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times [`flush`](MetadataStore::flush) has been called.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, tag: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == tag)
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (k, v) in iter {
            let (k, v) = (k.into(), v.into());
            match store.position(&k) {
                Some(i) => store.entries[i].1 = v,
                None => store.entries.push((k, v)),
            }
        }
        store
    }
}

impl MetadataStore for MemoryStore {
    fn contains(&self, tag: &str) -> bool {
        self.position(tag).is_some()
    }

    fn get(&self, tag: &str) -> Option<String> {
        self.position(tag).map(|i| self.entries[i].1.clone())
    }

    fn set(&mut self, tag: &str, value: &str) -> Result<()> {
        self.check(tag, value)?;
        match self.position(tag) {
            Some(i) => self.entries[i].1 = value.to_string(),
            None => self.entries.push((tag.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn check(&self, tag: &str, _value: &str) -> Result<()> {
        if tag.trim().is_empty() {
            bail!("Tag name must not be empty");
        }
        Ok(())
    }

    fn delete(&mut self, tag: &str) -> Removal {
        match self.position(tag) {
            Some(i) => {
                self.entries.remove(i);
                Removal::Removed
            }
            None => Removal::NotPresent,
        }
    }

    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
