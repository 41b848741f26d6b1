//! Header argument parsing for `#+begin_src` lines.
//!
//! Tokens are whitespace separated. A token starting with `:` is a key; the
//! next token is its value unless it is itself a key, in which case the key
//! is a flag with an empty value. Tokens before the first key are ignored.

use serde::{Deserialize, Serialize};

/// Ordered key → value map. Keys are unique; a repeated key overwrites the
/// earlier value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(Vec<(String, String)>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw parameter string such as `:tangle yes :noweb`.
    pub fn parse(raw: &str) -> Self {
        let mut params = Self::new();
        let mut tokens = raw.split_whitespace().peekable();

        while let Some(token) = tokens.next() {
            let Some(key) = token.strip_prefix(':') else {
                continue;
            };
            let value = match tokens.peek() {
                Some(next) if !next.starts_with(':') => tokens.next().unwrap_or_default(),
                _ => "",
            };
            params.insert(key, value);
        }

        params
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(params: &Parameters) -> Vec<(&str, &str)> {
        params.iter().collect()
    }

    #[test]
    fn keys_with_values() {
        let params = Parameters::parse(" :tangle src/main.rs :results output");
        assert_eq!(
            pairs(&params),
            vec![("tangle", "src/main.rs"), ("results", "output")]
        );
    }

    #[test]
    fn keys_followed_by_keys_are_flags() {
        let params = Parameters::parse(":noweb :exports code :eval");
        assert_eq!(
            pairs(&params),
            vec![("noweb", ""), ("exports", "code"), ("eval", "")]
        );
    }

    #[test]
    fn duplicate_key_last_wins_in_first_position() {
        let params = Parameters::parse(":a 1 :b 2 :a 3");
        assert_eq!(pairs(&params), vec![("a", "3"), ("b", "2")]);
        assert_eq!(params.get("a"), Some("3"));
    }

    #[test]
    fn stray_tokens_are_ignored() {
        let params = Parameters::parse("-n :var x=1 extra");
        assert_eq!(pairs(&params), vec![("var", "x=1")]);
    }

    #[test]
    fn empty_string_has_no_parameters() {
        assert!(Parameters::parse("   ").is_empty());
    }
}
