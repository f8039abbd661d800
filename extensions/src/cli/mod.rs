//! Terminal front end pieces.

mod prompter;

pub use prompter::ConsolePrompter;
