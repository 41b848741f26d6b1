use serde::Serialize;

use crate::parsing::rope::span::Span;

/// A source block node as emitted by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SrcBlockNode {
    pub language: String,
    /// Raw text after the language tag on the begin line.
    pub parameters: String,
    /// Full byte span including both marker lines.
    pub span: Span,
    /// Bytes strictly between the marker lines.
    pub content_span: Span,
    /// 1-based line of `#+begin_src`.
    pub begin_line: usize,
    /// 1-based line of `#+end_src`.
    pub end_line: usize,
}

/// A top-level node of an org document.
///
/// The tree is flat: source blocks never contain other nodes, and headings
/// only mark their own line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DocNode {
    Heading {
        level: u8,
        title: String,
        span: Span,
        line: usize,
    },
    Keyword {
        key: String,
        value: String,
        span: Span,
        line: usize,
    },
    Comment {
        span: Span,
        line: usize,
    },
    /// Consecutive non-blank prose lines.
    Text {
        span: Span,
        first_line: usize,
        last_line: usize,
    },
    SrcBlock(SrcBlockNode),
}

impl DocNode {
    pub fn span(&self) -> Span {
        match self {
            DocNode::Heading { span, .. }
            | DocNode::Keyword { span, .. }
            | DocNode::Comment { span, .. }
            | DocNode::Text { span, .. } => *span,
            DocNode::SrcBlock(node) => node.span,
        }
    }

    pub fn as_src_block(&self) -> Option<&SrcBlockNode> {
        match self {
            DocNode::SrcBlock(node) => Some(node),
            DocNode::Heading { .. }
            | DocNode::Keyword { .. }
            | DocNode::Comment { .. }
            | DocNode::Text { .. } => None,
        }
    }
}
