/// The opening line of a source block, split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrcOpen<'a> {
    pub language: &'a str,
    /// Everything after the language tag, untrimmed.
    pub parameters: &'a str,
}

/// Source block delimiters. All `#+begin_src` / `#+end_src` syntax
/// knowledge for the parser lives here.
pub struct SrcBlock;

impl SrcBlock {
    pub const BEGIN: &'static str = "#+begin_src";
    pub const END: &'static str = "#+end_src";

    /// Recognizes `#+begin_src <language> <parameters...>`.
    ///
    /// The language tag is mandatory and made of word characters; a bare
    /// `#+begin_src` is not a block opener.
    pub fn open(line: &str) -> Option<SrcOpen<'_>> {
        let rest = line.trim_start().strip_prefix(Self::BEGIN)?;
        let after_ws = rest.trim_start();
        if after_ws.len() == rest.len() {
            return None;
        }
        let lang_len = after_ws
            .char_indices()
            .find(|(_, c)| !is_word_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(after_ws.len());
        if lang_len == 0 {
            return None;
        }
        Some(SrcOpen {
            language: &after_ws[..lang_len],
            parameters: &after_ws[lang_len..],
        })
    }

    pub fn closes(line: &str) -> bool {
        line.trim() == Self::END
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_opener_with_parameters() {
        let open = SrcBlock::open("#+begin_src python :results output").unwrap();
        assert_eq!(open.language, "python");
        assert_eq!(open.parameters, " :results output");
    }

    #[test]
    fn detect_indented_opener() {
        let open = SrcBlock::open("   #+begin_src sh").unwrap();
        assert_eq!(open.language, "sh");
        assert_eq!(open.parameters, "");
    }

    #[test]
    fn opener_requires_language() {
        assert_eq!(SrcBlock::open("#+begin_src"), None);
        assert_eq!(SrcBlock::open("#+begin_src   "), None);
        assert_eq!(SrcBlock::open("#+begin_srcpython"), None);
    }

    #[test]
    fn language_stops_at_first_non_word_char() {
        let open = SrcBlock::open("#+begin_src emacs-lisp").unwrap();
        assert_eq!(open.language, "emacs");
        assert_eq!(open.parameters, "-lisp");
    }

    #[test]
    fn closer_allows_surrounding_whitespace() {
        assert!(SrcBlock::closes("  #+end_src  "));
        assert!(!SrcBlock::closes("#+end_src x"));
        assert!(!SrcBlock::closes("#+END_SRC"));
    }
}
