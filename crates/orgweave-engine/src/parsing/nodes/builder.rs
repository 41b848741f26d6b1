use crate::parsing::{ParseError, rope::span::Span};

use super::{
    classify::{LineClass, LineKind},
    types::{DocNode, SrcBlockNode},
};

#[derive(Debug, Clone)]
enum LeafState {
    None,
    Text {
        start: Span,
        first_line: usize,
        last_line: usize,
        last_line_end: usize,
    },
    Src {
        language: String,
        parameters: String,
        begin: Span,
        begin_line: usize,
    },
}

/// Phase 2 of parsing: folds classified lines into [`DocNode`]s.
pub struct NodeBuilder {
    leaf: LeafState,
    out: Vec<DocNode>,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self {
            leaf: LeafState::None,
            out: vec![],
        }
    }

    pub fn push(&mut self, c: &LineClass) {
        if self.in_src() {
            self.consume_src_line(c);
            return;
        }

        match &c.kind {
            LineKind::Blank => self.flush_text(),
            LineKind::SrcBegin {
                language,
                parameters,
            } => {
                self.flush_text();
                self.leaf = LeafState::Src {
                    language: language.clone(),
                    parameters: parameters.clone(),
                    begin: c.line,
                    begin_line: c.number,
                };
            }
            LineKind::Heading { level, title } => {
                self.flush_text();
                self.out.push(DocNode::Heading {
                    level: *level,
                    title: title.clone(),
                    span: c.line,
                    line: c.number,
                });
            }
            LineKind::Keyword { key, value } => {
                self.flush_text();
                self.out.push(DocNode::Keyword {
                    key: key.clone(),
                    value: value.clone(),
                    span: c.line,
                    line: c.number,
                });
            }
            LineKind::Comment => {
                self.flush_text();
                self.out.push(DocNode::Comment {
                    span: c.line,
                    line: c.number,
                });
            }
            // A stray end marker outside any block is plain prose.
            LineKind::SrcEnd | LineKind::Text => self.extend_text(c),
        }
    }

    pub fn finish(mut self) -> Result<Vec<DocNode>, ParseError> {
        // EOF flush
        self.flush_text();
        if let LeafState::Src { begin_line, .. } = self.leaf {
            return Err(ParseError::UnterminatedSrcBlock { line: begin_line });
        }
        Ok(self.out)
    }

    fn in_src(&self) -> bool {
        matches!(self.leaf, LeafState::Src { .. })
    }

    fn consume_src_line(&mut self, c: &LineClass) {
        // Only an end marker closes; nested begin markers are content.
        if c.kind != LineKind::SrcEnd {
            return;
        }
        let prev = std::mem::replace(&mut self.leaf, LeafState::None);
        if let LeafState::Src {
            language,
            parameters,
            begin,
            begin_line,
        } = prev
        {
            self.out.push(DocNode::SrcBlock(SrcBlockNode {
                language,
                parameters,
                span: begin.cover(c.line),
                content_span: Span::new(begin.end, c.line.start),
                begin_line,
                end_line: c.number,
            }));
        }
    }

    fn extend_text(&mut self, c: &LineClass) {
        match self.leaf {
            LeafState::Text {
                start, first_line, ..
            } => {
                self.leaf = LeafState::Text {
                    start,
                    first_line,
                    last_line: c.number,
                    last_line_end: c.line.end,
                };
            }
            _ => {
                self.leaf = LeafState::Text {
                    start: c.line,
                    first_line: c.number,
                    last_line: c.number,
                    last_line_end: c.line.end,
                };
            }
        }
    }

    fn flush_text(&mut self) {
        let prev = std::mem::replace(&mut self.leaf, LeafState::None);
        if let LeafState::Text {
            start,
            first_line,
            last_line,
            last_line_end,
        } = prev
        {
            self.out.push(DocNode::Text {
                span: Span::new(start.start, last_line_end),
                first_line,
                last_line,
            });
        } else {
            self.leaf = prev; // put back a pending source block
        }
    }
}

impl Default for NodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
