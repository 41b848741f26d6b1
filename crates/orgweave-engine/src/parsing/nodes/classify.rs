use crate::parsing::rope::{lines::LineRef, span::Span};

use super::kinds::{Heading, Keyword, SrcBlock};

/// What a single line looks like in isolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    SrcBegin { language: String, parameters: String },
    SrcEnd,
    Heading { level: u8, title: String },
    Keyword { key: String, value: String },
    Comment,
    Text,
}

/// Classification of a single line containing only local facts.
///
/// This is phase 1 of parsing: each line is classified independently
/// without reference to surrounding context.
#[derive(Debug, Clone)]
pub struct LineClass {
    /// 1-based line number.
    pub number: usize,
    /// Full byte span of this line in the rope.
    pub line: Span,
    pub kind: LineKind,
}

/// Classifies individual lines for the node building phase.
pub struct OrgLineClassifier;

impl OrgLineClassifier {
    /// Classifies a line into a [`LineClass`].
    ///
    /// Source markers take precedence over keywords, keywords over comments.
    pub fn classify(&self, lr: &LineRef) -> LineClass {
        let text = lr.trimmed();
        let kind = if text.trim().is_empty() {
            LineKind::Blank
        } else if let Some(open) = SrcBlock::open(text) {
            LineKind::SrcBegin {
                language: open.language.to_string(),
                parameters: open.parameters.to_string(),
            }
        } else if SrcBlock::closes(text) {
            LineKind::SrcEnd
        } else if let Some((level, title)) = Heading::parse(text) {
            LineKind::Heading {
                level,
                title: title.to_string(),
            }
        } else if let Some((key, value)) = Keyword::parse(text) {
            LineKind::Keyword {
                key: key.to_string(),
                value: value.to_string(),
            }
        } else if Keyword::is_comment(text) {
            LineKind::Comment
        } else {
            LineKind::Text
        };

        LineClass {
            number: lr.number,
            line: lr.span,
            kind,
        }
    }
}
