//! Uniquing filename storage
//!
//! Debug info stores 32-bit filename ids; this table resolves them back to
//! bytes. Filenames are kept verbatim with no UTF-8 validation.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Interned filename storage with O(1) hash-based deduplication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilenameTable {
    names: Vec<Vec<u8>>,
    /// Deduplication index: hash -> indices sharing that hash.
    /// A list because distinct names can collide.
    #[serde(skip)]
    dedup_index: FxHashMap<u64, Vec<u32>>,
}

impl FilenameTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn hash_name(name: &[u8]) -> u64 {
        let mut hasher = rustc_hash::FxHasher::default();
        name.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern a filename, returning its id.
    ///
    /// Identical byte strings always map to the same id.
    pub fn intern(&mut self, name: &[u8]) -> u32 {
        let hash = Self::hash_name(name);

        if let Some(indices) = self.dedup_index.get(&hash) {
            for &idx in indices {
                if self.names[idx as usize] == name {
                    return idx;
                }
            }
        }

        let idx = self.names.len() as u32;
        self.names.push(name.to_vec());
        self.dedup_index.entry(hash).or_default().push(idx);
        idx
    }

    /// Intern a filename given as UTF-8 text
    #[inline]
    pub fn intern_str(&mut self, name: &str) -> u32 {
        self.intern(name.as_bytes())
    }

    /// Rebuild the dedup index after deserialization
    pub fn rebuild_dedup_index(&mut self) {
        self.dedup_index.clear();
        for (idx, name) in self.names.iter().enumerate() {
            let hash = Self::hash_name(name);
            self.dedup_index.entry(hash).or_default().push(idx as u32);
        }
    }

    /// Get the filename bytes for an id
    #[inline]
    pub fn get(&self, id: u32) -> Option<&[u8]> {
        self.names.get(id as usize).map(Vec::as_slice)
    }

    /// Number of interned filenames
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the table is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over filenames in id order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.names.iter().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let mut table = FilenameTable::new();

        let a = table.intern_str("a.js");
        let b = table.intern_str("b.js");
        let a2 = table.intern_str("a.js");

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(a2, 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_get() {
        let mut table = FilenameTable::new();
        let id = table.intern(b"\xff\xfenot-utf8");

        assert_eq!(table.get(id), Some(&b"\xff\xfenot-utf8"[..]));
        assert_eq!(table.get(99), None);
    }

    #[test]
    fn test_rebuild_dedup_index() {
        let mut table = FilenameTable::new();
        table.intern_str("a.js");
        table.intern_str("b.js");

        let json = serde_json::to_string(&table).unwrap();
        let mut restored: FilenameTable = serde_json::from_str(&json).unwrap();
        restored.rebuild_dedup_index();

        assert_eq!(restored.intern_str("a.js"), 0);
        assert_eq!(restored.intern_str("c.js"), 2);
    }
}
