use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use relative_path::RelativePathBuf;

use crate::blocks::{BlockInfo, ExtractError, Extractor};
use crate::io::{self, IoError};

use super::BlockManifest;

/// Why a single document was left out of a manifest.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Outcome of processing one document, before the merge.
pub(crate) type DocumentResult = (RelativePathBuf, Result<Vec<BlockInfo>, DocumentError>);

/// Builds a [`BlockManifest`] from a project's documents.
///
/// Documents are read and extracted in parallel. A document that cannot be
/// read or extracted is logged and left out; it never stops the rest of the
/// project from being indexed.
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder {
    extractor: Extractor,
}

impl ManifestBuilder {
    pub fn new(extractor: Extractor) -> Self {
        Self { extractor }
    }

    /// Reads and indexes `document_paths`, each either absolute under
    /// `project_root` or already root-relative.
    pub fn build(&self, project_root: &Path, document_paths: &[PathBuf]) -> BlockManifest {
        let results: Vec<DocumentResult> = document_paths
            .par_iter()
            .filter_map(|path| match io::to_document_path(project_root, path) {
                Ok(relative) => Some(relative),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping document");
                    None
                }
            })
            .map(|relative| {
                let result = io::read_document(&relative, project_root)
                    .map_err(DocumentError::from)
                    .and_then(|content| {
                        self.extractor
                            .extract(&relative, &content)
                            .map_err(DocumentError::from)
                    });
                (relative, result)
            })
            .collect();

        merge(BlockManifest::new(project_root), results)
    }

    /// Indexes in-memory documents, e.g. unsaved editor buffers.
    pub fn build_from_sources<I>(&self, project_root: &Path, sources: I) -> BlockManifest
    where
        I: IntoIterator<Item = (RelativePathBuf, String)>,
    {
        let sources: Vec<_> = sources.into_iter().collect();
        let results: Vec<DocumentResult> = sources
            .par_iter()
            .map(|(path, content)| {
                let result = self
                    .extractor
                    .extract(path, content)
                    .map_err(DocumentError::from);
                (path.clone(), result)
            })
            .collect();

        merge(BlockManifest::new(project_root), results)
    }
}

/// Serial merge step: each document's keys are written exactly once, in
/// the order the results were produced.
pub(crate) fn merge(mut manifest: BlockManifest, results: Vec<DocumentResult>) -> BlockManifest {
    let mut seen = BTreeSet::new();
    let mut dropped = 0usize;

    for (path, result) in results {
        if !seen.insert(path.clone()) {
            tracing::debug!(document = %path, "document listed twice, keeping first");
            continue;
        }
        match result {
            Ok(blocks) => manifest.replace_document(path, blocks),
            Err(e) => {
                dropped += 1;
                tracing::warn!(document = %path, error = %e, "excluding document from manifest");
            }
        }
    }

    tracing::info!(
        documents = manifest.document_count(),
        blocks = manifest.block_count(),
        dropped,
        "manifest built"
    );
    manifest
}
