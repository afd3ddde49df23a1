//! Tooling & Integration Layer
//!
//! The `grove` command line: argument parsing, command execution and text
//! rendering of trees.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands, OutputFormat};
