use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::blocks::BlockInfo;

use super::hash::ContentHash;

/// Extraction results memoized by `(absolute path, content hash)`.
///
/// One entry is kept per path; a lookup with a different hash misses.
/// Entries only go away through [`ExtractMemo::invalidate`].
#[derive(Debug, Default)]
pub struct ExtractMemo {
    entries: HashMap<PathBuf, (ContentHash, Arc<Vec<BlockInfo>>)>,
}

impl ExtractMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path, hash: ContentHash) -> Option<Arc<Vec<BlockInfo>>> {
        self.entries
            .get(path)
            .filter(|(stored, _)| *stored == hash)
            .map(|(_, blocks)| Arc::clone(blocks))
    }

    pub fn insert(&mut self, path: PathBuf, hash: ContentHash, blocks: Arc<Vec<BlockInfo>>) {
        self.entries.insert(path, (hash, blocks));
    }

    /// Drops the memo entry for `path`. Returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
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
