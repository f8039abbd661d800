use std::ops::Range;

use pulldown_cmark::{Event, Parser, Tag as MdTag};
use serde::{Deserialize, Serialize};

use crate::frontmatter::{self, Frontmatter, FrontmatterValue};

use super::TagSet;

pub const TAGS_KEY: &str = "tags";
pub const TAGS_LINE_PREFIX: &str = "Tags:";

/// Where a note keeps its tags. Chosen once in the configuration and used for both
/// creating and reclassifying notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagStore {
    /// A `Tags: a, b` line directly below the first heading.
    InlineLine,
    /// A `tags: [a, b]` entry in the frontmatter block.
    #[default]
    FrontmatterKey,
}

impl TagStore {
    /// Writes `tags` into `content`, replacing tags already stored there.
    pub fn apply(&self, content: &str, tags: &TagSet) -> String {
        match self {
            TagStore::FrontmatterKey => {
                frontmatter::upsert(content, &[(TAGS_KEY, FrontmatterValue::List(tags.to_strings()))])
            }
            TagStore::InlineLine => {
                let line = format!("{} {}", TAGS_LINE_PREFIX, tags);
                let slot = InlineSlot::find(content);
                let mut out = String::with_capacity(content.len() + line.len() + 2);
                match slot.existing {
                    Some(existing) => {
                        out.push_str(&content[..existing.line.start]);
                        out.push_str(&line);
                        out.push_str(&content[existing.line.end..]);
                    }
                    None => {
                        out.push_str(&content[..slot.at]);
                        if slot.at > 0 && !out.ends_with('\n') {
                            out.push('\n');
                        }
                        out.push_str(&line);
                        out.push('\n');
                        out.push_str(&content[slot.at..]);
                    }
                }
                out
            }
        }
    }

    /// Removes any tags stored according to this convention.
    pub fn strip(&self, content: &str) -> String {
        match self {
            TagStore::FrontmatterKey => frontmatter::remove(content, TAGS_KEY),
            TagStore::InlineLine => match InlineSlot::find(content).existing {
                Some(existing) => format!("{}{}", &content[..existing.line.start], &content[existing.end..]),
                None => content.to_string(),
            },
        }
    }

    /// Reads the tags currently stored in `content`.
    pub fn read(&self, content: &str) -> TagSet {
        match self {
            TagStore::FrontmatterKey => match Frontmatter::parse(content).and_then(|fm| fm.get(TAGS_KEY)) {
                Some(FrontmatterValue::List(items)) => items.into_iter().collect(),
                Some(FrontmatterValue::Scalar(value)) => TagSet::parse(&value),
                None => TagSet::new(),
            },
            TagStore::InlineLine => match InlineSlot::find(content).existing {
                Some(existing) => {
                    let line = &content[existing.line];
                    TagSet::parse(&line[TAGS_LINE_PREFIX.len()..])
                }
                None => TagSet::new(),
            },
        }
    }
}

/// The one position an inline tags line may occupy: the line right after the first
/// heading, or the first line of the body when there is no heading.
struct InlineSlot {
    at: usize,
    existing: Option<TagsLine>,
}

struct TagsLine {
    /// The line without its line break.
    line: Range<usize>,
    /// End of the line including its line break.
    end: usize,
}

impl InlineSlot {
    fn find(content: &str) -> Self {
        let start = body_offset(content);
        let heading_end = Parser::new(&content[start..])
            .into_offset_iter()
            .find_map(|(event, range)| match event {
                Event::Start(MdTag::Heading { .. }) => Some(start + range.end),
                _ => None,
            });

        let at = match heading_end {
            Some(end) if content[..end].ends_with('\n') => end,
            Some(end) => content[end..].find('\n').map(|i| end + i + 1).unwrap_or(content.len()),
            None => start,
        };

        let rest = &content[at..];
        let existing = rest.starts_with(TAGS_LINE_PREFIX).then(|| {
            let (len, end) = match rest.find('\n') {
                Some(i) => (i, at + i + 1),
                None => (rest.len(), content.len()),
            };
            let len = if rest[..len].ends_with('\r') { len - 1 } else { len };
            TagsLine { line: at..at + len, end }
        });
        InlineSlot { at, existing }
    }
}

/// Offset of the note body, i.e. after any frontmatter.
fn body_offset(content: &str) -> usize {
    Frontmatter::parse(content).map(|fm| fm.body_offset()).unwrap_or(0)
}
