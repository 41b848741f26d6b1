//! # Block Manifest
//!
//! The project-wide index of blocks, keyed both by owning document and by
//! virtual address. Every block reachable through one map is reachable
//! through the other under its own address; `replace_document` and
//! `remove_document` keep that true by updating both maps together.

pub mod builder;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use relative_path::{RelativePath, RelativePathBuf};
use serde::{Deserialize, Serialize};

use crate::address::{BlockTarget, VirtualAddress};
use crate::blocks::BlockInfo;

pub use builder::{DocumentError, ManifestBuilder};

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("block {address} of {document} is missing from the address index")]
    MissingAddress {
        document: RelativePathBuf,
        address: String,
    },
    #[error("address {address} points at a block not listed under its document")]
    DanglingAddress { address: String },
    #[error("address {key} is stored under a block whose address is {actual}")]
    MismatchedAddress { key: String, actual: String },
    #[error("document {document} has block index {found} at position {expected}")]
    IndexOutOfOrder {
        document: RelativePathBuf,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockManifest {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub project_root: PathBuf,
    by_document: BTreeMap<RelativePathBuf, Vec<Arc<BlockInfo>>>,
    by_address: BTreeMap<String, Arc<BlockInfo>>,
}

impl BlockManifest {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            version: MANIFEST_VERSION,
            generated_at: Utc::now(),
            project_root: project_root.into(),
            by_document: BTreeMap::new(),
            by_address: BTreeMap::new(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Blocks of one document in document order.
    pub fn blocks_for(&self, document_path: &RelativePath) -> Option<&[Arc<BlockInfo>]> {
        self.by_document
            .get(document_path)
            .map(Vec::as_slice)
    }

    pub fn contains_document(&self, document_path: &RelativePath) -> bool {
        self.by_document.contains_key(document_path)
    }

    /// Exact lookup by address string.
    pub fn block(&self, address: &str) -> Option<&Arc<BlockInfo>> {
        self.by_address.get(address)
    }

    /// Structural lookup by document and target. Selector and extension are
    /// routing details and do not take part; a name target picks the first
    /// block with that name in document order.
    pub fn lookup(&self, address: &VirtualAddress) -> Option<&Arc<BlockInfo>> {
        let blocks = self.blocks_for(&address.document_path)?;
        match &address.target {
            BlockTarget::Index(index) => blocks.get(*index),
            target @ BlockTarget::Name(_) => blocks.iter().find(|b| b.matches(target)),
        }
    }

    pub fn documents(&self) -> impl Iterator<Item = (&RelativePathBuf, &[Arc<BlockInfo>])> {
        self.by_document.iter().map(|(p, b)| (p, b.as_slice()))
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Arc<BlockInfo>> {
        self.by_address.values()
    }

    pub fn document_count(&self) -> usize {
        self.by_document.len()
    }

    pub fn block_count(&self) -> usize {
        self.by_address.len()
    }

    /// Swaps in a freshly extracted set of blocks for one document,
    /// dropping all of its previous addresses first.
    pub fn replace_document(&mut self, document_path: RelativePathBuf, blocks: Vec<BlockInfo>) {
        self.remove_document(&document_path);
        let blocks: Vec<Arc<BlockInfo>> = blocks.into_iter().map(Arc::new).collect();
        for block in &blocks {
            self.by_address
                .insert(block.virtual_address.clone(), Arc::clone(block));
        }
        self.by_document.insert(document_path, blocks);
    }

    /// Removes a document and all of its addresses.
    pub fn remove_document(&mut self, document_path: &RelativePath) -> Option<Vec<Arc<BlockInfo>>> {
        let removed = self.by_document.remove(document_path)?;
        for block in &removed {
            self.by_address.remove(&block.virtual_address);
        }
        Some(removed)
    }

    /// Verifies that both indexes describe the same set of blocks.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut listed = 0usize;
        for (document, blocks) in &self.by_document {
            for (expected, block) in blocks.iter().enumerate() {
                if block.index != expected {
                    return Err(InvariantViolation::IndexOutOfOrder {
                        document: document.clone(),
                        expected,
                        found: block.index,
                    });
                }
                match self.by_address.get(&block.virtual_address) {
                    Some(indexed) if Arc::ptr_eq(indexed, block) || indexed == block => {}
                    _ => {
                        return Err(InvariantViolation::MissingAddress {
                            document: document.clone(),
                            address: block.virtual_address.clone(),
                        });
                    }
                }
                listed += 1;
            }
        }

        for (key, block) in &self.by_address {
            if *key != block.virtual_address {
                return Err(InvariantViolation::MismatchedAddress {
                    key: key.clone(),
                    actual: block.virtual_address.clone(),
                });
            }
        }

        if listed != self.by_address.len() {
            let dangling = self
                .by_address
                .iter()
                .find(|(_, b)| {
                    self.blocks_for(&b.document_path)
                        .is_none_or(|blocks| !blocks.iter().any(|l| l == *b))
                })
                .map(|(k, _)| k.clone())
                .unwrap_or_default();
            return Err(InvariantViolation::DanglingAddress { address: dangling });
        }

        Ok(())
    }
}
