//! Tags and the conventions used to store them inside a note.

use std::fmt;

use serde::{Deserialize, Serialize};

mod store;

pub use store::TagStore;

/// A normalized tag: trimmed, lowercase and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    /// Normalizes `raw` into a tag. A leading `#` is dropped, as are characters that
    /// would break the `[a, b]` list syntax. Returns `None` if nothing is left.
    pub fn new(raw: &str) -> Option<Tag> {
        let cleaned: String = raw.trim()
            .trim_start_matches('#')
            .chars()
            .filter(|c| !matches!(c, ',' | '[' | ']'))
            .collect();
        let cleaned = cleaned.trim().to_lowercase();
        if cleaned.is_empty() {
            None
        } else {
            Some(Tag(cleaned))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tags of a single note. Duplicates are ignored; first-seen order is kept for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    pub fn new() -> Self {
        TagSet::default()
    }

    /// Parses a comma separated list, as typed by a user or found on a `Tags:` line.
    pub fn parse(list: &str) -> Self {
        list.split(',').collect()
    }

    /// Adds a tag, returning `false` if it was already present.
    pub fn insert(&mut self, tag: Tag) -> bool {
        if self.0.contains(&tag) {
            false
        } else {
            self.0.push(tag);
            true
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t.as_str() == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|t| t.0.clone()).collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter.into_iter().filter_map(|s| Tag::new(s.as_ref())) {
            set.insert(tag);
        }
        set
    }
}

impl From<Vec<String>> for TagSet {
    fn from(list: Vec<String>) -> Self {
        list.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.0.into_iter().map(|t| t.0).collect()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(tag.as_str())?;
        }
        Ok(())
    }
}
