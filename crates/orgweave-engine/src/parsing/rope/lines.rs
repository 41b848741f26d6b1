use xi_rope::Rope;

use super::span::Span;

/// A reference to a single line in the rope with its byte span.
#[derive(Debug, Clone)]
pub struct LineRef {
    /// 1-based line number.
    pub number: usize,
    /// Byte span of this line in the rope (includes newline if present).
    pub span: Span,
    /// The line text, newline included.
    pub text: String,
}

impl LineRef {
    /// Line text without the trailing `\n` / `\r\n`.
    pub fn trimmed(&self) -> &str {
        self.text.trim_end_matches(['\r', '\n'])
    }
}

/// Returns an iterator over lines with their byte spans and line numbers.
///
/// Uses `lines_raw` to preserve newline characters so spans stay contiguous.
pub fn lines_with_spans(rope: &Rope) -> impl Iterator<Item = LineRef> + '_ {
    let mut offset = 0usize;
    rope.lines_raw(..).enumerate().map(move |(i, line)| {
        let start = offset;
        offset += line.len();
        LineRef {
            number: i + 1,
            span: Span { start, end: offset },
            text: line.into_owned(),
        }
    })
}
