//! # Engine
//!
//! [`BlockEngine`] ties extraction, the manifest and the caches together for
//! long-running hosts such as an editor integration or a build watcher.
//!
//! The engine owns its extraction memo and derived-output cache; nothing is
//! shared process-wide. File changes are applied one at a time in arrival
//! order and each change invalidates the document's cached data before the
//! manifest entry is replaced.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use relative_path::{RelativePath, RelativePathBuf};
use serde::Serialize;

use crate::address::{DEFAULT_SELECTOR, ExtensionTable, VirtualAddress};
use crate::blocks::{BlockInfo, ExtractError, ExtractOptions, Extractor};
use crate::cache::{BlockCache, CacheKey, ContentHash, ExtractMemo};
use crate::io::{self, DocumentFilter, IoError};
use crate::manifest::builder::{DocumentResult, merge};
use crate::manifest::{BlockManifest, DocumentError};
use crate::position::{Location, Position, map_location_to_document, to_block};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub default_selector: String,
    pub extensions: ExtensionTable,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_selector: DEFAULT_SELECTOR.to_string(),
            extensions: ExtensionTable::default(),
        }
    }
}

impl From<&EngineOptions> for ExtractOptions {
    fn from(options: &EngineOptions) -> Self {
        ExtractOptions {
            default_selector: options.default_selector.clone(),
            extensions: options.extensions.clone(),
        }
    }
}

/// A file-change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentChange {
    /// `path` is absolute under the project root or root-relative.
    Modified { path: PathBuf, content: String },
    Removed { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    Updated {
        document_path: RelativePathBuf,
        blocks: usize,
    },
    Removed {
        document_path: RelativePathBuf,
        existed: bool,
    },
    /// The new content could not be extracted; the document is no longer
    /// in the manifest.
    Dropped {
        document_path: RelativePathBuf,
        error: ExtractError,
    },
}

/// One block presented as a standalone file to a semantic engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualDocument {
    pub address: String,
    pub language: String,
    pub content: String,
}

/// A language-aware consumer of virtual documents, e.g. a type checker that
/// only understands standalone files.
pub trait EmbeddedLanguageService {
    fn open(&mut self, document: &VirtualDocument);

    fn close(&mut self, address: &str);

    /// Definition sites for the symbol at a block-local position, in the
    /// service's own coordinates.
    fn definitions(&self, address: &VirtualAddress, position: Position) -> Vec<Location>;
}

pub struct BlockEngine {
    project_root: PathBuf,
    options: EngineOptions,
    extractor: Extractor,
    memo: ExtractMemo,
    cache: BlockCache<String>,
    /// Addresses last opened in a language service, per document.
    published: HashMap<RelativePathBuf, Vec<String>>,
}

impl BlockEngine {
    pub fn new(project_root: impl Into<PathBuf>, options: EngineOptions) -> Self {
        let extractor = Extractor::new(ExtractOptions::from(&options));
        Self {
            project_root: project_root.into(),
            options,
            extractor,
            memo: ExtractMemo::new(),
            cache: BlockCache::new(),
            published: HashMap::new(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Extracts one document, reusing the memoized result when the content
    /// hash matches the last extraction of the same path.
    pub fn extract(
        &mut self,
        document_path: &RelativePath,
        content: &str,
    ) -> Result<Arc<Vec<BlockInfo>>, ExtractError> {
        let absolute = document_path.to_path(&self.project_root);
        let hash = ContentHash::of(content);

        if let Some(blocks) = self.memo.get(&absolute, hash) {
            tracing::debug!(document = %document_path, %hash, "extraction memo hit");
            return Ok(blocks);
        }

        tracing::debug!(document = %document_path, %hash, "extraction memo miss");
        let blocks = Arc::new(self.extractor.extract(document_path, content)?);
        self.memo.insert(absolute, hash, Arc::clone(&blocks));
        Ok(blocks)
    }

    /// Reads and indexes `document_paths`. Unchanged documents come from the
    /// memo; the rest have their cached data invalidated and are extracted
    /// in parallel, then merged serially.
    pub fn build_manifest(&mut self, document_paths: &[PathBuf]) -> BlockManifest {
        let mut pending = Vec::with_capacity(document_paths.len());
        for path in document_paths {
            let relative = match io::to_document_path(&self.project_root, path) {
                Ok(relative) => relative,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping document");
                    continue;
                }
            };
            let content = match io::read_document(&relative, &self.project_root) {
                Ok(content) => content,
                Err(e) => {
                    self.invalidate_document(&relative);
                    pending.push(Pending::Ready((relative, Err(e.into()))));
                    continue;
                }
            };

            let absolute = relative.to_path(&self.project_root);
            let hash = ContentHash::of(&content);
            match self.memo.get(&absolute, hash) {
                Some(blocks) => {
                    tracing::debug!(document = %relative, "extraction memo hit");
                    pending.push(Pending::Ready((relative, Ok(Arc::unwrap_or_clone(blocks)))));
                }
                None => {
                    self.invalidate_document(&relative);
                    pending.push(Pending::Extract {
                        relative,
                        absolute,
                        hash,
                        content,
                    });
                }
            }
        }

        let extractor = &self.extractor;
        let outcomes: Vec<(DocumentResult, Option<(PathBuf, ContentHash)>)> = pending
            .into_par_iter()
            .map(|p| match p {
                Pending::Ready(result) => (result, None),
                Pending::Extract {
                    relative,
                    absolute,
                    hash,
                    content,
                } => {
                    let result = extractor
                        .extract(&relative, &content)
                        .map_err(DocumentError::from);
                    ((relative, result), Some((absolute, hash)))
                }
            })
            .collect();

        let mut results = Vec::with_capacity(outcomes.len());
        for ((relative, result), memo_key) in outcomes {
            if let (Ok(blocks), Some((absolute, hash))) = (&result, memo_key) {
                self.memo.insert(absolute, hash, Arc::new(blocks.clone()));
            }
            results.push((relative, result));
        }

        merge(BlockManifest::new(self.project_root.clone()), results)
    }

    /// Scans the project root with `filter` and indexes every match.
    pub fn build_project_manifest(
        &mut self,
        filter: &DocumentFilter,
    ) -> Result<BlockManifest, IoError> {
        let paths: Vec<PathBuf> = io::scan_documents(&self.project_root, filter)?
            .iter()
            .map(|p| p.to_path(""))
            .collect();
        Ok(self.build_manifest(&paths))
    }

    /// Applies one file change to `manifest`.
    pub fn apply_change(
        &mut self,
        manifest: &mut BlockManifest,
        change: DocumentChange,
    ) -> Result<ChangeOutcome, IoError> {
        match change {
            DocumentChange::Modified { path, content } => {
                let document_path = io::to_document_path(&self.project_root, &path)?;
                self.invalidate_document(&document_path);

                match self.extract(&document_path, &content) {
                    Ok(blocks) => {
                        let count = blocks.len();
                        manifest.replace_document(document_path.clone(), Arc::unwrap_or_clone(blocks));
                        Ok(ChangeOutcome::Updated {
                            document_path,
                            blocks: count,
                        })
                    }
                    Err(error) => {
                        tracing::warn!(document = %document_path, %error, "excluding document from manifest");
                        manifest.remove_document(&document_path);
                        Ok(ChangeOutcome::Dropped {
                            document_path,
                            error,
                        })
                    }
                }
            }
            DocumentChange::Removed { path } => {
                let document_path = io::to_document_path(&self.project_root, &path)?;
                self.invalidate_document(&document_path);
                let existed = manifest.remove_document(&document_path).is_some();
                Ok(ChangeOutcome::Removed {
                    document_path,
                    existed,
                })
            }
        }
    }

    /// Applies changes in order; later changes to a document win.
    pub fn apply_changes<I>(
        &mut self,
        manifest: &mut BlockManifest,
        changes: I,
    ) -> Result<Vec<ChangeOutcome>, IoError>
    where
        I: IntoIterator<Item = DocumentChange>,
    {
        changes
            .into_iter()
            .map(|change| self.apply_change(manifest, change))
            .collect()
    }

    /// Drops cached output and the extraction memo for one document.
    pub fn invalidate_document(&mut self, document_path: &RelativePath) {
        let outputs = self.cache.invalidate_document(document_path);
        let memoized = self
            .memo
            .invalidate(&document_path.to_path(&self.project_root));
        tracing::debug!(document = %document_path, outputs, memoized, "invalidated document");
    }

    /// Derived output for `block`, computed on first use.
    pub fn cached_output(&mut self, block: &BlockInfo, compute: impl FnOnce(&BlockInfo) -> String) -> &str {
        self.cache
            .get_or_insert_with(CacheKey::for_block(block), || compute(block))
    }

    pub fn cache(&self) -> &BlockCache<String> {
        &self.cache
    }

    pub fn memo(&self) -> &ExtractMemo {
        &self.memo
    }

    /// The standalone view of the block behind `address`.
    pub fn virtual_document(&self, address: &str, manifest: &BlockManifest) -> Option<VirtualDocument> {
        let address = VirtualAddress::decode(address)?;
        let block = manifest.lookup(&address)?;
        Some(VirtualDocument {
            address: address.encode(),
            language: block.language.clone(),
            content: block.content.clone(),
        })
    }

    /// Brings `service` in line with the current blocks of one document.
    /// Addresses opened by an earlier call that are no longer in the
    /// manifest are closed, then every current block is opened. Returns how
    /// many were opened.
    pub fn publish_document(
        &mut self,
        document_path: &RelativePath,
        manifest: &BlockManifest,
        service: &mut dyn EmbeddedLanguageService,
    ) -> usize {
        let blocks = manifest.blocks_for(document_path).unwrap_or_default();
        let previous = self.published.remove(document_path).unwrap_or_default();

        for address in &previous {
            if !blocks.iter().any(|b| &b.virtual_address == address) {
                tracing::debug!(document = %document_path, %address, "closing superseded block");
                service.close(address);
            }
        }
        for block in blocks {
            service.open(&VirtualDocument {
                address: block.virtual_address.clone(),
                language: block.language.clone(),
                content: block.content.clone(),
            });
        }

        if !blocks.is_empty() {
            self.published.insert(
                document_path.to_relative_path_buf(),
                blocks.iter().map(|b| b.virtual_address.clone()).collect(),
            );
        }
        blocks.len()
    }

    /// Asks `service` for definitions of the symbol at a document position
    /// and maps the answers back into document space. Answers that cannot
    /// be mapped are dropped.
    pub fn definitions(
        &self,
        document_path: &RelativePath,
        position: Position,
        manifest: &BlockManifest,
        service: &dyn EmbeddedLanguageService,
    ) -> Vec<Location> {
        let Some(local) = to_block(document_path, position, manifest) else {
            return Vec::new();
        };
        service
            .definitions(&local.block.address(), local.position)
            .iter()
            .filter_map(|location| map_location_to_document(location, manifest))
            .collect()
    }
}

enum Pending {
    Ready(DocumentResult),
    Extract {
        relative: RelativePathBuf,
        absolute: PathBuf,
        hash: ContentHash,
        content: String,
    },
}
