//! Marker line patterns used by the extractor's own line scan.

use regex::Regex;
use std::sync::LazyLock;

/// `#+begin_src <language><parameters>`
pub static BEGIN_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\+begin_src\s+(\w+)(.*)$").expect("Invalid begin marker regex")
});

pub static END_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\+end_src\s*$").expect("Invalid end marker regex"));

pub static NAME_DIRECTIVE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\+name:\s*(.+)$").expect("Invalid name directive regex"));

/// A begin or end marker found by the line scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedBlock {
    pub language: String,
    pub parameter_string: String,
    pub name: Option<String>,
    /// 0-based indices into the document's lines.
    pub begin: usize,
    pub end: usize,
}

/// Returns `(language, parameter string)` for a begin marker line.
pub fn begin_marker(line: &str) -> Option<(&str, &str)> {
    let caps = BEGIN_MARKER_REGEX.captures(line)?;
    let language = caps.get(1)?.as_str();
    let params = caps.get(2).map_or("", |m| m.as_str());
    Some((language, params))
}

pub fn is_end_marker(line: &str) -> bool {
    END_MARKER_REGEX.is_match(line)
}

pub fn name_directive(line: &str) -> Option<&str> {
    NAME_DIRECTIVE_REGEX
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|name| !name.is_empty())
}

/// Lines the backward name search may step over.
fn is_directive_or_blank(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Scans document lines for source blocks.
///
/// Each begin marker takes the nearest following end marker; a begin marker
/// without one ends the scan. Lines inside a block are never treated as
/// markers.
pub fn scan(lines: &[&str]) -> Vec<ScannedBlock> {
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < lines.len() {
        let Some((language, params)) = begin_marker(lines[i]) else {
            i += 1;
            continue;
        };
        let Some(offset) = lines[i + 1..].iter().position(|l| is_end_marker(l)) else {
            break;
        };
        let end = i + 1 + offset;
        out.push(ScannedBlock {
            language: language.to_string(),
            parameter_string: params.to_string(),
            name: find_name(lines, i),
            begin: i,
            end,
        });
        i = end + 1;
    }

    out
}

/// Walks backward from a begin marker over blank and `#` lines looking for
/// the closest `#+name:` directive.
fn find_name(lines: &[&str], begin: usize) -> Option<String> {
    for line in lines[..begin].iter().rev() {
        if begin_marker(line).is_some() || is_end_marker(line) {
            return None;
        }
        if !is_directive_or_blank(line) {
            return None;
        }
        if let Some(name) = name_directive(line) {
            return Some(name.to_string());
        }
    }
    None
}
