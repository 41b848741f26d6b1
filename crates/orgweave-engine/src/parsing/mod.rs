//! # Document Parsing
//!
//! Turns raw org text into a flat, typed node list. The block extractor only
//! depends on the [`DocumentParser`] trait; [`OrgParser`] is the bundled
//! implementation.

pub mod nodes;
pub mod rope;

use xi_rope::Rope;

use nodes::{DocNode, NodeBuilder, OrgLineClassifier, SrcBlockNode};
use rope::lines_with_spans;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("source block opened on line {line} is never closed")]
    UnterminatedSrcBlock { line: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDoc {
    pub nodes: Vec<DocNode>,
}

impl ParsedDoc {
    /// Source block nodes in document order.
    pub fn src_blocks(&self) -> impl Iterator<Item = &SrcBlockNode> {
        self.nodes.iter().filter_map(DocNode::as_src_block)
    }
}

/// Anything that can turn document text into a [`ParsedDoc`].
///
/// Implementations must emit exactly one `SrcBlock` node per source block,
/// in document order; the extractor correlates nodes with marker lines by
/// position.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, content: &str) -> Result<ParsedDoc, ParseError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrgParser;

impl DocumentParser for OrgParser {
    fn parse(&self, content: &str) -> Result<ParsedDoc, ParseError> {
        parse_document(&Rope::from(content))
    }
}

pub fn parse_document(rope: &Rope) -> Result<ParsedDoc, ParseError> {
    let classifier = OrgLineClassifier;
    let mut builder = NodeBuilder::new();

    for lr in lines_with_spans(rope) {
        let lc = classifier.classify(&lr);
        builder.push(&lc);
    }

    Ok(ParsedDoc {
        nodes: builder.finish()?,
    })
}
