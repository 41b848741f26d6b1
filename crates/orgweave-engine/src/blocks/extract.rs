use std::fmt;
use std::sync::Arc;

use relative_path::RelativePath;

use crate::address::{DEFAULT_SELECTOR, ExtensionTable, encode_index};
use crate::parsing::{DocumentParser, OrgParser, ParseError, nodes::SrcBlockNode};

use super::{
    info::{BlockId, BlockInfo},
    markers,
    params::Parameters,
};

/// Header argument naming the downstream transform that owns a block.
pub const SELECTOR_PARAMETER: &str = "selector";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("marker scan found {markers} source blocks but the parser produced {nodes}")]
    BlockCountMismatch { markers: usize, nodes: usize },
    #[error(
        "source block {index} begins on line {marker_line} in the marker scan but on line {node_line} in the parse tree"
    )]
    MarkerLineMismatch {
        index: usize,
        marker_line: usize,
        node_line: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Selector for blocks without a `:selector` header argument.
    pub default_selector: String,
    pub extensions: ExtensionTable,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            default_selector: DEFAULT_SELECTOR.to_string(),
            extensions: ExtensionTable::default(),
        }
    }
}

/// Turns document text into [`BlockInfo`]s.
///
/// Extraction is a pure function of the document path and content: no
/// filesystem access and no state carried between calls.
#[derive(Clone)]
pub struct Extractor {
    parser: Arc<dyn DocumentParser>,
    options: ExtractOptions,
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

impl Extractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            parser: Arc::new(OrgParser),
            options,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extracts every source block of one document, in document order.
    ///
    /// Marker lines found by the line scan are paired with the parser's
    /// source block nodes by position. Both must agree on how many blocks
    /// there are and where each begins, otherwise the document is rejected
    /// rather than indexed with mismatched metadata.
    pub fn extract(
        &self,
        document_path: &RelativePath,
        content: &str,
    ) -> Result<Vec<BlockInfo>, ExtractError> {
        let parsed = self.parser.parse(content)?;
        let nodes: Vec<&SrcBlockNode> = parsed.src_blocks().collect();

        let lines: Vec<&str> = content.lines().collect();
        let scanned = markers::scan(&lines);

        if scanned.len() != nodes.len() {
            return Err(ExtractError::BlockCountMismatch {
                markers: scanned.len(),
                nodes: nodes.len(),
            });
        }

        let mut out = Vec::with_capacity(scanned.len());
        for (index, (marker, node)) in scanned.iter().zip(nodes).enumerate() {
            let start_marker_line = marker.begin + 1;
            if node.begin_line != start_marker_line {
                return Err(ExtractError::MarkerLineMismatch {
                    index,
                    marker_line: start_marker_line,
                    node_line: node.begin_line,
                });
            }

            let parameters = Parameters::parse(&marker.parameter_string);
            let selector = self.selector_for(&parameters);
            let extension = self.options.extensions.extension_for(&marker.language);
            let virtual_address = encode_index(&selector, document_path, index, extension);

            out.push(BlockInfo {
                id: BlockId {
                    document_path: document_path.to_relative_path_buf(),
                    index,
                },
                document_path: document_path.to_relative_path_buf(),
                name: marker.name.clone(),
                index,
                language: marker.language.clone(),
                start_marker_line,
                end_marker_line: marker.end + 1,
                parameters,
                selector,
                virtual_address,
                content: lines[marker.begin + 1..marker.end].join("\n"),
            });
        }

        Ok(out)
    }

    fn selector_for(&self, parameters: &Parameters) -> String {
        match parameters.get(SELECTOR_PARAMETER) {
            Some(s) if !s.is_empty() && !s.contains(':') => s.to_string(),
            Some(s) => {
                tracing::debug!(selector = s, "ignoring unusable selector");
                self.options.default_selector.clone()
            }
            None => self.options.default_selector.clone(),
        }
    }
}

/// Extracts with the bundled org parser and default options.
pub fn extract(document_path: &RelativePath, content: &str) -> Result<Vec<BlockInfo>, ExtractError> {
    Extractor::default().extract(document_path, content)
}
