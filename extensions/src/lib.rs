//! Provider and front-end implementations for the traits in `notefiler_core`.

pub mod cli;
pub mod gemini;
