use glob::{MatchOptions, Pattern};
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

/// Include pattern used when none is configured.
pub const DEFAULT_INCLUDE: &str = "**/*.org";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid project root: {0}")]
    InvalidProjectRoot(String),
    #[error("Invalid glob pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("Path is outside the project root or not valid UTF-8: {0}")]
    UnrepresentablePath(PathBuf),
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Include/exclude globs deciding which files under a project root are
/// documents. Patterns match root-relative, slash separated paths.
#[derive(Debug, Clone)]
pub struct DocumentFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl DocumentFilter {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, IoError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    pub fn matches(&self, path: &RelativePath) -> bool {
        let path = path.as_str();
        self.include
            .iter()
            .any(|p| p.matches_with(path, MATCH_OPTIONS))
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_with(path, MATCH_OPTIONS))
    }
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self {
            include: vec![Pattern::new(DEFAULT_INCLUDE).expect("Invalid default include pattern")],
            exclude: vec![],
        }
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>, IoError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p.as_ref()).map_err(|source| IoError::InvalidPattern {
                pattern: p.as_ref().to_string(),
                source,
            })
        })
        .collect()
}

/// Read a document and return its content
pub fn read_document(relative_path: &RelativePath, project_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(project_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Maps a path given on the command line or by a watcher to a document path.
///
/// Absolute paths must live under `project_root`; relative paths are taken
/// as already root-relative.
pub fn to_document_path(project_root: &Path, path: &Path) -> Result<RelativePathBuf, IoError> {
    let relative = if path.is_absolute() {
        path.strip_prefix(project_root)
            .map_err(|_| IoError::UnrepresentablePath(path.to_path_buf()))?
    } else {
        path
    };
    RelativePathBuf::from_path(relative)
        .map(|p| p.normalize())
        .map_err(|_| IoError::UnrepresentablePath(path.to_path_buf()))
}

/// Scan for documents under the project root, sorted by path
pub fn scan_documents(
    project_root: &Path,
    filter: &DocumentFilter,
) -> Result<Vec<RelativePathBuf>, IoError> {
    validate_project_root(project_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(project_root, project_root, filter, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(
    root: &Path,
    dir: &Path,
    filter: &DocumentFilter,
    files: &mut Vec<RelativePathBuf>,
) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(root, &path, filter, files)?;
        } else if let Ok(relative) = to_document_path(root, &path)
            && filter.matches(&relative)
        {
            files.push(relative);
        }
    }

    Ok(())
}

pub fn validate_project_root(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidProjectRoot(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}
