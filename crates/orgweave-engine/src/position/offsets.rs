//! Byte offset ↔ line/character conversion over one block's text.
//!
//! Characters are byte columns. Out-of-range inputs are clamped to the
//! content and offsets are floored to a UTF-8 boundary.

use xi_rope::Rope;

use super::types::Position;

pub fn offset_to_position(content: &str, offset: usize) -> Position {
    let offset = floor_char_boundary(content, offset.min(content.len()));
    let rope = Rope::from(content);
    let line = rope.line_of_offset(offset);
    let character = offset - rope.offset_of_line(line);
    Position::new(saturating_u32(line), saturating_u32(character))
}

pub fn position_to_offset(content: &str, position: Position) -> usize {
    let rope = Rope::from(content);
    let last_line = rope.line_of_offset(rope.len());
    let line = position.line as usize;
    if line > last_line {
        return content.len();
    }

    let start = rope.offset_of_line(line);
    let end = if line < last_line {
        // Stop before the newline.
        rope.offset_of_line(line + 1) - 1
    } else {
        content.len()
    };
    let offset = (start + position.character as usize).min(end);
    floor_char_boundary(content, offset)
}

fn floor_char_boundary(content: &str, mut offset: usize) -> usize {
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const TEXT: &str = "let a = 1;\nlet b = 2;\n\nreturn a + b;";

    #[rstest]
    #[case(0, Position::new(0, 0))]
    #[case(4, Position::new(0, 4))]
    #[case(10, Position::new(0, 10))]
    #[case(11, Position::new(1, 0))]
    #[case(22, Position::new(2, 0))]
    #[case(23, Position::new(3, 0))]
    #[case(36, Position::new(3, 13))]
    #[case(1000, Position::new(3, 13))]
    fn offsets_to_positions(#[case] offset: usize, #[case] expected: Position) {
        assert_eq!(offset_to_position(TEXT, offset), expected);
    }

    #[rstest]
    #[case(Position::new(0, 0), 0)]
    #[case(Position::new(1, 4), 15)]
    #[case(Position::new(1, 99), 21)]
    #[case(Position::new(2, 5), 22)]
    #[case(Position::new(3, 6), 29)]
    #[case(Position::new(9, 0), 36)]
    fn positions_to_offsets(#[case] position: Position, #[case] expected: usize) {
        assert_eq!(position_to_offset(TEXT, position), expected);
    }

    #[test]
    fn multibyte_offsets_floor_to_boundary() {
        let text = "é = 1";
        assert_eq!(offset_to_position(text, 1), Position::new(0, 0));
        assert_eq!(position_to_offset(text, Position::new(0, 1)), 0);
        assert_eq!(position_to_offset(text, Position::new(0, 2)), 2);
    }

    #[test]
    fn empty_content() {
        assert_eq!(offset_to_position("", 5), Position::new(0, 0));
        assert_eq!(position_to_offset("", Position::new(3, 3)), 0);
    }
}
