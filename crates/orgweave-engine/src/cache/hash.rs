//! Content hashing for extraction memo keys.

use std::fmt;

/// A 128-bit XXH3 hash of document content.
///
/// Two documents with the same `ContentHash` are assumed to have identical
/// content.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    pub fn of(content: &str) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(content.as_bytes()).to_le_bytes())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(ContentHash::of("#+begin_src sh"), ContentHash::of("#+begin_src sh"));
    }

    #[test]
    fn different_inputs_differ() {
        assert_ne!(ContentHash::of("a"), ContentHash::of("b"));
    }

    #[test]
    fn display_is_hex() {
        let s = ContentHash::of("x").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
