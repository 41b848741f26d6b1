//! Reference strings: `<path>?name=<name>[&data...]`.

use relative_path::{RelativePath, RelativePathBuf};

/// How the path part of a reference is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// `/pages/a.org`: from the project root.
    Absolute,
    /// `./a.org`, `../a.org`: from the referencing document's directory.
    Relative,
    /// `pages/a.org`: treated like an absolute reference.
    Bare,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockReference {
    pub path: String,
    pub kind: PathKind,
    /// Value of the first `name=` item, if non-empty.
    pub name: Option<String>,
    /// Remaining query items, in order.
    pub data: Vec<String>,
}

impl BlockReference {
    pub fn parse(reference: &str) -> Self {
        let (path, query) = reference.split_once('?').unwrap_or((reference, ""));

        let mut name = None;
        let mut data = Vec::new();
        for item in query.split('&').filter(|item| !item.is_empty()) {
            match item.strip_prefix("name=") {
                Some(value) if name.is_none() => {
                    if !value.is_empty() {
                        name = Some(value.to_string());
                    }
                }
                _ => data.push(item.to_string()),
            }
        }

        Self {
            path: path.to_string(),
            kind: path_kind(path),
            name,
            data,
        }
    }

    /// The path without its anchoring prefix, normalized.
    pub fn normalized_path(&self) -> RelativePathBuf {
        RelativePath::new(self.path.trim_start_matches('/')).normalize()
    }
}

fn path_kind(path: &str) -> PathKind {
    if path.starts_with('/') {
        PathKind::Absolute
    } else if path == "." || path == ".." || path.starts_with("./") || path.starts_with("../") {
        PathKind::Relative
    } else {
        PathKind::Bare
    }
}
