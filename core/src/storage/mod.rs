//! Filesystem side of notefiler.
//!
//! Notes are plain UTF-8 Markdown files somewhere below a notes root. Besides loading
//! and saving [`Note`]s, this module knows how to list the folders that could receive a
//! note ([`list_folders`]) and how to clean up after a note has been moved away
//! ([`prune_upward`]).
//!
//! The root may contain a hidden `.notefiler` directory holding the configuration. It,
//! like every other hidden directory, is never offered as a destination.
//!
//! All I/O is `async` and runs on `tokio`.

pub use self::note::Note;
pub use self::pruner::prune_upward;
pub use self::scanner::list_folders;

mod note;
mod pruner;
mod scanner;

use std::path::PathBuf;
use thiserror::Error;

pub const INTERNAL_DIR_NAME: &str = ".notefiler";
pub const CONFIG_FILENAME: &str = "config.json";
pub const NOTE_EXTENSION: &str = "md";


#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Path is not a file: {0}")]
    NotAFile(PathBuf),

    #[error("Invalid path provided: {0}")]
    InvalidPath(String),

    #[error("A different file already exists at the destination: {0}")]
    DestinationExists(PathBuf),

    #[error("Note has never been saved to disk")]
    Unsaved,

    #[error("Configuration file is invalid: {0}")]
    InvalidConfig(PathBuf),

    #[error("Configuration serialization error")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration file already exists: {0}")]
    ConfigExists(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
