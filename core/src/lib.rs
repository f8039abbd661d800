//! Core library for notefiler.
//!
//! Notefiler takes a Markdown note, asks a chat model where the note belongs, lets the
//! user adjust the answer and then moves the note there. The pieces are small and mostly
//! independent:
//!
//! * [`chat`] is the minimal chat-completion interface a model provider implements.
//! * [`frontmatter`] patches the `---` delimited metadata block at the top of a note.
//! * [`path`] normalizes folder paths and ranks existing folders against a suggestion.
//! * [`tags`] stores tags either in the frontmatter or on a `Tags:` line.
//! * [`storage`] loads notes, scans folders and prunes empty directories.
//! * [`relocate`] writes a note to its new home.
//! * [`suggest`] and [`prompt`] are the seams to the chat model and to the user.
//! * [`organize`] ties everything together into a single operation.

pub mod chat;
pub mod config;
pub mod frontmatter;
pub mod organize;
pub mod path;
pub mod prompt;
pub mod relocate;
pub mod storage;
pub mod suggest;
pub mod tags;
