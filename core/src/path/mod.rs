//! Folder paths relative to the notes root.
//!
//! A [`FolderPath`] is a short sequence of lowercase, dash-separated segments. All
//! constructors normalize their input, so two folder paths that refer to the same
//! logical location always compare equal.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

mod matcher;

pub use matcher::{rank, score, ScoredFolder};

/// Maximum number of segments in a [`FolderPath`]. Deeper input is truncated.
pub const MAX_SEGMENTS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderPath {
    segments: Vec<String>,
}

impl FolderPath {
    /// The notes root itself.
    pub fn root() -> Self {
        FolderPath::default()
    }

    /// Parses a `/` or `\` separated path. Empty segments are dropped.
    pub fn parse(input: &str) -> Self {
        Self::from_segments(input.split(['/', '\\']))
    }

    /// Builds a path from raw segments, normalizing each and dropping those that end
    /// up empty.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments.into_iter()
            .map(|s| normalize_segment(s.as_ref()))
            .filter(|s| !s.is_empty())
            .take(MAX_SEGMENTS)
            .collect();
        FolderPath { segments }
    }

    /// Converts a path relative to the notes root.
    ///
    /// Returns `None` if the path is too deep, leaves the root, is not valid UTF-8 or
    /// has a component that normalizes to nothing.
    pub fn from_relative(path: &Path) -> Option<Self> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => {
                    let segment = normalize_segment(name.to_str()?);
                    if segment.is_empty() {
                        return None;
                    }
                    segments.push(segment);
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        if segments.len() > MAX_SEGMENTS {
            return None;
        }
        Some(FolderPath { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolves this folder below `root`.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.segments);
        path
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for FolderPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FolderPath::parse(s))
    }
}

impl From<&str> for FolderPath {
    fn from(s: &str) -> Self {
        FolderPath::parse(s)
    }
}

/// Lowercases a single segment and turns underscores and whitespace into dashes.
///
/// Anything that is not alphanumeric or a dash is removed, which also guarantees that
/// segments never contain a path separator.
pub fn normalize_segment(segment: &str) -> String {
    dashed(segment, |_| false)
}

/// Turns free text into a file name stem: lowercase, dash-separated and safe to use
/// on any filesystem. Dots are kept inside the name but not at its start.
pub fn slugify(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_suffix(".md").unwrap_or(text);
    dashed(text, |c| c == '.').trim_start_matches('.').to_string()
}

fn dashed(text: &str, keep: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.trim().chars() {
        if c.is_alphanumeric() || keep(c) {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(c.to_lowercase());
        } else if c == '-' || c == '_' || c.is_whitespace() {
            pending_dash = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_segments() {
        let path = FolderPath::parse("Projects/Work_Notes/ Big  Ideas ");
        assert_eq!(path.segments(), ["projects", "work-notes", "big-ideas"]);
        assert_eq!(path.to_string(), "projects/work-notes/big-ideas");
    }

    #[test]
    fn parse_drops_empty_segments_and_truncates() {
        let path = FolderPath::parse("/a//b/c/d/");
        assert_eq!(path.segments(), ["a", "b", "c"]);
        assert!(FolderPath::parse("///").is_empty());
    }

    #[test]
    fn segments_never_contain_separators() {
        let path = FolderPath::from_segments(["a/b", "..", "c\\d"]);
        assert_eq!(path.segments(), ["ab", "cd"]);
    }

    #[test]
    fn from_relative_rejects_parent_components() {
        assert_eq!(FolderPath::from_relative(Path::new("a/b")), Some(FolderPath::parse("a/b")));
        assert_eq!(FolderPath::from_relative(Path::new("../a")), None);
        assert_eq!(FolderPath::from_relative(Path::new("a/b/c/d")), None);
    }

    #[test]
    fn to_path_joins_below_root() {
        let path = FolderPath::parse("proj/notes");
        assert_eq!(path.to_path(Path::new("/notes")), PathBuf::from("/notes/proj/notes"));
        assert_eq!(FolderPath::root().to_path(Path::new("/notes")), PathBuf::from("/notes"));
    }

    #[test]
    fn slugify_file_names() {
        assert_eq!(slugify("Meeting Notes: Q3 Planning!"), "meeting-notes-q3-planning");
        assert_eq!(slugify("release_v1.2.md"), "release-v1.2");
        assert_eq!(slugify("..hidden"), "hidden");
        assert_eq!(slugify("  --  "), "");
    }
}
