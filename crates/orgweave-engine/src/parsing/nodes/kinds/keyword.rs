/// `#+key: value` lines and `#` comments.
pub struct Keyword;

impl Keyword {
    pub const PREFIX: &'static str = "#+";

    /// Returns `(key, value)` for a keyword line. Keys are kept as written.
    pub fn parse(line: &str) -> Option<(&str, &str)> {
        let rest = line.trim_start().strip_prefix(Self::PREFIX)?;
        let (key, value) = rest.split_once(':')?;
        if key.is_empty() || key.contains(char::is_whitespace) {
            return None;
        }
        Some((key, value.trim()))
    }

    /// Org comment: a line whose first non-blank character is `#`
    /// followed by whitespace or nothing.
    pub fn is_comment(line: &str) -> bool {
        match line.trim_start().strip_prefix('#') {
            Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t']),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_keyword() {
        assert_eq!(Keyword::parse("#+name: helpers"), Some(("name", "helpers")));
        assert_eq!(Keyword::parse("  #+title:  My Page "), Some(("title", "My Page")));
    }

    #[test]
    fn rejects_non_keywords() {
        assert_eq!(Keyword::parse("#+begin_src sh"), None);
        assert_eq!(Keyword::parse("#+: empty"), None);
        assert_eq!(Keyword::parse("plain: text"), None);
    }

    #[test]
    fn detects_comments() {
        assert!(Keyword::is_comment("# a comment"));
        assert!(Keyword::is_comment("#"));
        assert!(!Keyword::is_comment("#+name: x"));
        assert!(!Keyword::is_comment("#hashtag"));
    }
}
