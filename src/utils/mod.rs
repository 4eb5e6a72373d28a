//! Utility modules for the static site generator.

pub mod fs;
pub mod git;
pub mod log;
