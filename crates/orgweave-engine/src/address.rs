//! Virtual block addresses.
//!
//! A virtual address is the opaque string downstream tooling uses as an
//! import target for a single block:
//!
//! ```text
//! vaddr:block:<selector>:<documentPath>:<index>.<extension>
//! vaddr:block:<selector>:<documentPath>:NAME:<name>.<extension>
//! ```
//!
//! Callers decode an address into a [`VirtualAddress`] once and work with
//! the structured record from then on.

use std::collections::BTreeMap;
use std::fmt;

use relative_path::{RelativePath, RelativePathBuf};
use serde::{Deserialize, Serialize};

pub const ADDRESS_PREFIX: &str = "vaddr:block:";

/// Selector used when a block does not name its downstream transform.
pub const DEFAULT_SELECTOR: &str = "default";

/// Extension used for languages missing from the lookup table.
pub const FALLBACK_EXTENSION: &str = "txt";

const NAME_MARKER: &str = ":NAME:";

/// How an address points at a block inside its document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockTarget {
    Index(usize),
    Name(String),
}

impl fmt::Display for BlockTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTarget::Index(index) => write!(f, "#{index}"),
            BlockTarget::Name(name) => write!(f, "{name:?}"),
        }
    }
}

/// Decoded form of a virtual address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VirtualAddress {
    pub selector: String,
    pub document_path: RelativePathBuf,
    pub target: BlockTarget,
    pub extension: String,
}

impl VirtualAddress {
    pub fn new(
        selector: impl Into<String>,
        document_path: impl Into<RelativePathBuf>,
        target: BlockTarget,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            selector: selector.into(),
            document_path: document_path.into(),
            target,
            extension: extension.into(),
        }
    }

    /// Serializes to the interop string form.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parses an address string. Anything malformed yields `None`; this is
    /// routinely used as an "is this a block address" check.
    pub fn decode(address: &str) -> Option<Self> {
        let rest = address.strip_prefix(ADDRESS_PREFIX)?;
        let (selector, rest) = rest.split_once(':')?;
        let (body, extension) = rest.rsplit_once('.')?;

        let (document_path, target) = match body.split_once(NAME_MARKER) {
            Some((path, name)) => (path, BlockTarget::Name(name.to_string())),
            None => {
                let (path, index) = body.rsplit_once(':')?;
                if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                (path, BlockTarget::Index(index.parse().ok()?))
            }
        };

        let decoded = Self::new(selector, document_path, target, extension);
        decoded.is_valid().then_some(decoded)
    }

    /// Whether this address survives an encode/decode round trip.
    pub fn is_valid(&self) -> bool {
        let path = self.document_path.as_str();
        let selector_ok = !self.selector.is_empty()
            && !self.selector.contains(':')
            && !self.selector.contains('\n');
        let path_ok = !path.is_empty() && !path.contains(NAME_MARKER) && !path.contains('\n');
        let target_ok = match &self.target {
            BlockTarget::Index(_) => true,
            BlockTarget::Name(name) => !name.is_empty() && !name.contains('\n'),
        };
        let extension_ok = !self.extension.is_empty()
            && self.extension.bytes().all(|b| b.is_ascii_alphanumeric());
        selector_ok && path_ok && target_ok && extension_ok
    }

    pub fn is_named(&self) -> bool {
        matches!(self.target, BlockTarget::Name(_))
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ADDRESS_PREFIX}{}:{}", self.selector, self.document_path)?;
        match &self.target {
            BlockTarget::Index(index) => write!(f, ":{index}")?,
            BlockTarget::Name(name) => write!(f, "{NAME_MARKER}{name}")?,
        }
        write!(f, ".{}", self.extension)
    }
}

/// Cheap check used by callers that receive arbitrary strings.
pub fn is_virtual_address(candidate: &str) -> bool {
    VirtualAddress::decode(candidate).is_some()
}

/// Built-in language tag to file extension table.
pub fn extension_for_language(language: &str) -> Option<&'static str> {
    let ext = match language.to_ascii_lowercase().as_str() {
        "js" | "javascript" | "node" => "js",
        "jsx" => "jsx",
        "ts" | "typescript" => "ts",
        "tsx" => "tsx",
        "py" | "python" => "py",
        "rs" | "rust" => "rs",
        "sh" | "bash" | "shell" | "zsh" => "sh",
        "json" => "json",
        "css" => "css",
        "html" => "html",
        "sql" | "sqlite" => "sql",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "elisp" | "emacs" => "el",
        "c" => "c",
        "cpp" => "cpp",
        "go" => "go",
        "ruby" | "rb" => "rb",
        "org" => "org",
        _ => return None,
    };
    Some(ext)
}

/// Language → extension lookup with configurable overrides on top of the
/// built-in table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionTable {
    overrides: BTreeMap<String, String>,
}

impl ExtensionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides are keyed case-insensitively by language tag.
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            overrides: overrides
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
                .collect(),
        }
    }

    pub fn extension_for(&self, language: &str) -> &str {
        self.overrides
            .get(&language.to_ascii_lowercase())
            .map(String::as_str)
            .or_else(|| extension_for_language(language))
            .unwrap_or(FALLBACK_EXTENSION)
    }
}

/// Encodes the index-form address for a block.
pub fn encode_index(
    selector: &str,
    document_path: &RelativePath,
    index: usize,
    extension: &str,
) -> String {
    VirtualAddress::new(
        selector,
        document_path,
        BlockTarget::Index(index),
        extension,
    )
    .encode()
}

/// Encodes the name-form address for a block.
pub fn encode_name(
    selector: &str,
    document_path: &RelativePath,
    name: &str,
    extension: &str,
) -> String {
    VirtualAddress::new(
        selector,
        document_path,
        BlockTarget::Name(name.to_string()),
        extension,
    )
    .encode()
}
