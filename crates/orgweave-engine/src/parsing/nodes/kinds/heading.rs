/// Org headings: one or more `*` in column zero followed by whitespace.
pub struct Heading;

impl Heading {
    pub const STAR: char = '*';

    /// Returns `(level, title)` for a heading line.
    pub fn parse(line: &str) -> Option<(u8, &str)> {
        let stars = line.chars().take_while(|c| *c == Self::STAR).count();
        if stars == 0 {
            return None;
        }
        let rest = &line[stars..];
        if !rest.starts_with([' ', '\t']) {
            return None;
        }
        let level = u8::try_from(stars).unwrap_or(u8::MAX);
        Some((level, rest.trim()))
    }
}
