//! Line-based editing of the frontmatter block at the top of a note.
//!
//! The block is the text between a leading `---` line and the next `---` line. It is
//! treated as a list of `key: value` lines rather than parsed as YAML, so anything this
//! module does not understand is passed through untouched.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

pub const DELIMITER: &str = "---";

static BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A---\r?\n(?:((?s:.*?))\r?\n)?---(?:\r?\n|\z)").expect("frontmatter pattern is valid")
});

/// Value of a frontmatter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FrontmatterValue {
    /// Renders a full `key: value` line. Lists use the inline `[a, b]` form without
    /// quoting.
    pub fn render(&self, key: &str) -> String {
        format!("{}: {}", key, self)
    }

    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            Some(inner) => FrontmatterValue::List(
                inner.split(',')
                    .map(unquote)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            None => FrontmatterValue::Scalar(unquote(raw).to_string()),
        }
    }
}

impl fmt::Display for FrontmatterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontmatterValue::Scalar(value) => f.write_str(value),
            FrontmatterValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for FrontmatterValue {
    fn from(value: &str) -> Self {
        FrontmatterValue::Scalar(value.to_string())
    }
}

impl From<String> for FrontmatterValue {
    fn from(value: String) -> Self {
        FrontmatterValue::Scalar(value)
    }
}

impl<S: Into<String>> From<Vec<S>> for FrontmatterValue {
    fn from(items: Vec<S>) -> Self {
        FrontmatterValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// A frontmatter block found at the start of a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    /// Non-blank body lines, delimiters excluded.
    lines: Vec<&'a str>,
    /// Byte offset of the first character after the closing delimiter line.
    end: usize,
}

impl<'a> Frontmatter<'a> {
    /// Finds the block at offset 0 of `content`, if there is one.
    pub fn parse(content: &'a str) -> Option<Self> {
        let captures = BLOCK.captures(content)?;
        let end = captures.get(0)?.end();
        let lines = captures.get(1)
            .map(|body| body.as_str().lines()
                .filter(|line| !line.trim().is_empty() && *line != DELIMITER)
                .collect())
            .unwrap_or_default();
        Some(Frontmatter { lines, end })
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Byte offset where the note body starts.
    pub fn body_offset(&self) -> usize {
        self.end
    }

    /// Reads the value of a top-level key.
    pub fn get(&self, key: &str) -> Option<FrontmatterValue> {
        self.lines.iter()
            .find(|line| line_key(line) == Some(key))
            .and_then(|line| line.split_once(':'))
            .map(|(_, value)| FrontmatterValue::parse(value))
    }
}

/// Sets each key in `entries` in the frontmatter of `content` and returns the result.
///
/// Existing lines for those keys are replaced in place; keys that were not present are
/// appended in the order given. Other lines keep their text and relative order. If the
/// note has no frontmatter, a new block holding just `entries` is prepended.
pub fn upsert<K: AsRef<str>>(content: &str, entries: &[(K, FrontmatterValue)]) -> String {
    if entries.is_empty() {
        return content.to_string();
    }
    let rendered: Vec<String> = entries.iter()
        .map(|(key, value)| value.render(key.as_ref()))
        .collect();

    let Some(block) = Frontmatter::parse(content) else {
        return assemble(&rendered, content, line_ending(content));
    };

    let mut applied = vec![false; entries.len()];
    let mut lines: Vec<String> = Vec::with_capacity(block.lines.len() + entries.len());
    let mut replacing = false;
    for line in &block.lines {
        // Indented or `- item` lines continue the value of the previous key
        if replacing && is_continuation(line) {
            continue;
        }
        let index = line_key(line)
            .and_then(|key| entries.iter().position(|(k, _)| k.as_ref() == key));
        replacing = index.is_some();
        match index {
            Some(i) => {
                lines.push(rendered[i].clone());
                applied[i] = true;
            }
            None => lines.push(line.to_string()),
        }
    }
    for (i, line) in rendered.into_iter().enumerate() {
        if !applied[i] {
            lines.push(line);
        }
    }

    assemble(&lines, &content[block.end..], line_ending(content))
}

/// Removes `key` (and any continuation lines of its value) from the frontmatter of
/// `content`. A block left without any lines is dropped entirely.
pub fn remove(content: &str, key: &str) -> String {
    let Some(block) = Frontmatter::parse(content) else {
        return content.to_string();
    };

    let mut removed = false;
    let mut skipping = false;
    let mut lines = Vec::with_capacity(block.lines.len());
    for line in &block.lines {
        if skipping && is_continuation(line) {
            continue;
        }
        skipping = line_key(line) == Some(key);
        if skipping {
            removed = true;
        } else {
            lines.push(*line);
        }
    }

    let rest = &content[block.end..];
    if !removed {
        content.to_string()
    } else if lines.is_empty() {
        rest.to_string()
    } else {
        assemble(&lines, rest, line_ending(content))
    }
}

fn assemble<S: AsRef<str>>(lines: &[S], rest: &str, newline: &str) -> String {
    let mut out = String::with_capacity(rest.len() + 64);
    out.push_str(DELIMITER);
    out.push_str(newline);
    for line in lines {
        out.push_str(line.as_ref());
        out.push_str(newline);
    }
    out.push_str(DELIMITER);
    out.push_str(newline);
    out.push_str(rest);
    out
}

/// The line ending of the first line of `content`; `\n` if it has none.
fn line_ending(content: &str) -> &'static str {
    match content.find('\n') {
        Some(i) if content[..i].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

/// Returns the key of a top-level `key: value` line.
fn line_key(line: &str) -> Option<&str> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let (key, _) = line.split_once(':')?;
    let key = key.trim_end();
    if key.is_empty() || key.contains(char::is_whitespace) || key.starts_with('-') {
        None
    } else {
        Some(key)
    }
}

fn is_continuation(line: &str) -> bool {
    line.starts_with(char::is_whitespace) || line.starts_with("- ")
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}
