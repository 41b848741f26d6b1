use std::fmt;

use relative_path::RelativePathBuf;
use serde::{Deserialize, Serialize};

use crate::address::{BlockTarget, VirtualAddress};

use super::params::Parameters;

/// Stable identity of a block: its document and position in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId {
    pub document_path: RelativePathBuf,
    pub index: usize,
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.document_path, self.index)
    }
}

/// Everything known about one source block after extraction.
///
/// Instances are produced by a full extraction pass over one document and
/// are never edited afterwards; a changed document yields a fresh set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub id: BlockId,
    /// Relative, slash separated.
    pub document_path: RelativePathBuf,
    /// From a preceding `#+name:` directive. Not unique.
    pub name: Option<String>,
    /// 0-based, sequential in document order.
    pub index: usize,
    pub language: String,
    /// 1-based line of the `#+begin_src` marker.
    pub start_marker_line: usize,
    /// 1-based line of the `#+end_src` marker.
    pub end_marker_line: usize,
    pub parameters: Parameters,
    /// Downstream transform owning this block.
    pub selector: String,
    /// Index-form virtual address; always derived.
    pub virtual_address: String,
    /// Raw text between the markers, lines joined with `\n`.
    pub content: String,
}

impl BlockInfo {
    /// Structured form of [`BlockInfo::virtual_address`].
    pub fn address(&self) -> VirtualAddress {
        VirtualAddress::new(
            self.selector.clone(),
            self.document_path.clone(),
            BlockTarget::Index(self.index),
            self.extension(),
        )
    }

    /// Name-form address, when the block is named.
    pub fn named_address(&self) -> Option<VirtualAddress> {
        let name = self.name.as_ref()?;
        Some(VirtualAddress::new(
            self.selector.clone(),
            self.document_path.clone(),
            BlockTarget::Name(name.clone()),
            self.extension(),
        ))
    }

    /// Extension recorded in the virtual address.
    pub fn extension(&self) -> &str {
        self.virtual_address
            .rsplit_once('.')
            .map_or("", |(_, ext)| ext)
    }

    /// Number of content lines between the markers.
    pub fn content_line_count(&self) -> usize {
        self.end_marker_line.saturating_sub(self.start_marker_line + 1)
    }

    /// True when the 0-based editor `line` maps into this block: after the
    /// begin marker and before the 0-based end-marker line.
    pub fn contains_line(&self, line: usize) -> bool {
        self.start_marker_line < line && line + 1 < self.end_marker_line
    }

    pub fn matches(&self, target: &BlockTarget) -> bool {
        match target {
            BlockTarget::Index(index) => self.index == *index,
            BlockTarget::Name(name) => self.name.as_deref() == Some(name.as_str()),
        }
    }
}
