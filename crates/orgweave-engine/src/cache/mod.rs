//! # Cache & Invalidation
//!
//! - **`BlockCache`**: derived per-block output (rendered HTML, transformed
//!   code...) keyed by a structured [`CacheKey`]
//! - **`ExtractMemo`**: extraction results keyed by path and content hash
//!
//! Keys are compared field by field. A document path is never matched as a
//! substring of another, so invalidating `a.org` leaves `data/a.org` alone.

pub mod hash;
pub mod memo;

use std::collections::HashMap;

use relative_path::{RelativePath, RelativePathBuf};

use crate::address::{BlockTarget, VirtualAddress};
use crate::blocks::BlockInfo;

pub use hash::ContentHash;
pub use memo::ExtractMemo;

/// `(selector, document path, block identity)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub selector: String,
    pub document_path: RelativePathBuf,
    pub block: BlockTarget,
}

impl CacheKey {
    pub fn new(
        selector: impl Into<String>,
        document_path: impl Into<RelativePathBuf>,
        block: BlockTarget,
    ) -> Self {
        Self {
            selector: selector.into(),
            document_path: document_path.into(),
            block,
        }
    }

    /// Key for a block addressed by index.
    pub fn for_block(block: &BlockInfo) -> Self {
        Self::new(
            block.selector.clone(),
            block.document_path.clone(),
            BlockTarget::Index(block.index),
        )
    }

    pub fn for_address(address: &VirtualAddress) -> Self {
        Self::new(
            address.selector.clone(),
            address.document_path.clone(),
            address.target.clone(),
        )
    }
}

/// Derived output per block. Single writer: mutation needs `&mut self`.
#[derive(Debug)]
pub struct BlockCache<V> {
    entries: HashMap<CacheKey, V>,
}

impl<V> Default for BlockCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V> BlockCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&V> {
        self.entries.get(key)
    }

    /// Stores `value`, returning the previous value for the key.
    pub fn set(&mut self, key: CacheKey, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Returns the cached value, computing and storing it on a miss.
    pub fn get_or_insert_with(&mut self, key: CacheKey, compute: impl FnOnce() -> V) -> &V {
        self.entries.entry(key).or_insert_with(compute)
    }

    pub fn remove(&mut self, key: &CacheKey) -> Option<V> {
        self.entries.remove(key)
    }

    /// Removes every entry whose document path equals `document_path`.
    /// Returns the number of entries removed.
    pub fn invalidate_document(&mut self, document_path: &RelativePath) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|key, _| key.document_path.as_relative_path() != document_path);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
