//! Tooling Layer
//!
//! Command-line surface over the discovery core: argument parsing, command
//! dispatch and text/json rendering of results.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
