use std::sync::Arc;

use relative_path::RelativePathBuf;
use serde::{Deserialize, Serialize};

use crate::address::VirtualAddress;
use crate::blocks::BlockInfo;

/// 0-based line and character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// What a [`Location`] is expressed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationTarget {
    Document(RelativePathBuf),
    Address(VirtualAddress),
}

/// A range in either document space or block space, as reported by a
/// semantic service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub target: LocationTarget,
    pub range: Range,
}

/// A position translated into a block's local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockPosition {
    pub block: Arc<BlockInfo>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentPosition {
    pub document_path: RelativePathBuf,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockRange {
    pub block: Arc<BlockInfo>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRange {
    pub document_path: RelativePathBuf,
    pub range: Range,
}
