//! # Cross-Reference Resolution
//!
//! Turns a reference written inside one document (or inside a block, given
//! by its virtual address) into the block it points at.
//!
//! References come in two shapes:
//!
//! - `<path>?name=<name>[&data...]` where `<path>` is absolute (`/x.org`),
//!   relative (`./x.org`, `../x.org`) or bare (`x.org`, read from the root)
//! - a virtual address, resolved directly by index or name
//!
//! Duplicate names resolve to the first block in document order.

pub mod reference;

use std::path::Path;
use std::sync::Arc;

use relative_path::{Component, RelativePath, RelativePathBuf};
use serde::Serialize;

use crate::address::{BlockTarget, VirtualAddress};
use crate::blocks::BlockInfo;
use crate::manifest::BlockManifest;

pub use reference::{BlockReference, PathKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("relative reference {reference:?} has no referencing document to resolve against")]
    MissingContext { reference: String },
    #[error("reference {reference:?} does not name a block (expected `?name=<name>`)")]
    MissingName { reference: String },
    #[error("document {path} is not in the manifest")]
    DocumentNotFound { path: RelativePathBuf },
    #[error("no block {target} in {path}")]
    BlockNotFound {
        path: RelativePathBuf,
        target: BlockTarget,
    },
    #[error("block index {index} is out of bounds for {path} ({len} blocks)")]
    IndexOutOfBounds {
        path: RelativePathBuf,
        index: usize,
        len: usize,
    },
}

impl ResolveError {
    /// Stable tag for tooling output.
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::MissingContext { .. } => "MISSING_CONTEXT",
            ResolveError::MissingName { .. } => "MISSING_NAME",
            ResolveError::DocumentNotFound { .. } => "DOCUMENT_NOT_FOUND",
            ResolveError::BlockNotFound { .. } => "BLOCK_NOT_FOUND",
            ResolveError::IndexOutOfBounds { .. } => "INDEX_OUT_OF_BOUNDS",
        }
    }
}

/// Where a reference was written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReferenceContext {
    #[default]
    None,
    Document(RelativePathBuf),
    /// Inside a block; the owning document comes from the address.
    Address(VirtualAddress),
}

impl ReferenceContext {
    /// Decodes `context` as a virtual address if it is one, otherwise takes
    /// it as a document path. An empty string means no context.
    pub fn parse(context: &str) -> Self {
        if context.is_empty() {
            return ReferenceContext::None;
        }
        match VirtualAddress::decode(context) {
            Some(address) => ReferenceContext::Address(address),
            None => ReferenceContext::Document(
                RelativePath::new(context.trim_start_matches('/')).normalize(),
            ),
        }
    }

    pub fn document_path(&self) -> Option<&RelativePath> {
        match self {
            ReferenceContext::None => None,
            ReferenceContext::Document(path) => Some(path),
            ReferenceContext::Address(address) => Some(&address.document_path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBlock {
    pub document_path: RelativePathBuf,
    pub block: Arc<BlockInfo>,
    /// Extra query items carried by the reference.
    pub data: Vec<String>,
}

pub fn resolve(
    reference: &str,
    context: &ReferenceContext,
    project_root: &Path,
    manifest: &BlockManifest,
) -> Result<ResolvedBlock, ResolveError> {
    if let Some(address) = VirtualAddress::decode(reference) {
        return resolve_address(&address, manifest);
    }

    let parsed = BlockReference::parse(reference);
    let Some(name) = parsed.name.clone() else {
        return Err(ResolveError::MissingName {
            reference: reference.to_string(),
        });
    };

    let path = resolve_path(&parsed, context, project_root, manifest).ok_or_else(|| {
        ResolveError::MissingContext {
            reference: reference.to_string(),
        }
    })?;

    let blocks = documents_blocks(&path, manifest)?;
    let target = BlockTarget::Name(name);
    let block = blocks
        .iter()
        .find(|b| b.matches(&target))
        .ok_or_else(|| ResolveError::BlockNotFound {
            path: path.clone(),
            target,
        })?;

    Ok(ResolvedBlock {
        document_path: path,
        block: Arc::clone(block),
        data: parsed.data,
    })
}

/// Resolves an already decoded address.
pub fn resolve_address(
    address: &VirtualAddress,
    manifest: &BlockManifest,
) -> Result<ResolvedBlock, ResolveError> {
    let path = address.document_path.normalize();
    let blocks = documents_blocks(&path, manifest)?;

    let block = match &address.target {
        BlockTarget::Index(index) => {
            blocks
                .get(*index)
                .ok_or_else(|| ResolveError::IndexOutOfBounds {
                    path: path.clone(),
                    index: *index,
                    len: blocks.len(),
                })?
        }
        target @ BlockTarget::Name(_) => blocks
            .iter()
            .find(|b| b.matches(target))
            .ok_or_else(|| ResolveError::BlockNotFound {
                path: path.clone(),
                target: target.clone(),
            })?,
    };

    Ok(ResolvedBlock {
        document_path: path,
        block: Arc::clone(block),
        data: Vec::new(),
    })
}

/// Resolves the path part of a reference to a root-relative document path.
/// `None` means a relative reference without a referencing document.
///
/// An absolute reference names a root-relative document first. Only when no
/// such document is indexed is it read as a filesystem path under the root.
fn resolve_path(
    reference: &BlockReference,
    context: &ReferenceContext,
    project_root: &Path,
    manifest: &BlockManifest,
) -> Option<RelativePathBuf> {
    match reference.kind {
        PathKind::Relative => {
            let document = context.document_path()?;
            let base = document.parent().unwrap_or(RelativePath::new(""));
            Some(base.join_normalized(&reference.path))
        }
        PathKind::Absolute => {
            let root_relative = reference.normalized_path();
            if manifest.contains_document(&root_relative) {
                return Some(root_relative);
            }
            let inside_root = if project_root.is_absolute() {
                Path::new(&reference.path)
                    .strip_prefix(project_root)
                    .ok()
                    .and_then(|p| RelativePathBuf::from_path(p).ok())
            } else {
                None
            };
            Some(inside_root.map_or(root_relative, |path| path.normalize()))
        }
        PathKind::Bare => Some(reference.normalized_path()),
    }
}

fn documents_blocks<'m>(
    path: &RelativePath,
    manifest: &'m BlockManifest,
) -> Result<&'m [Arc<BlockInfo>], ResolveError> {
    let escapes_root = matches!(path.components().next(), Some(Component::ParentDir));
    let blocks = if escapes_root {
        None
    } else {
        manifest.blocks_for(path)
    };
    blocks.ok_or_else(|| ResolveError::DocumentNotFound {
        path: path.to_relative_path_buf(),
    })
}
