//! Command-line interface for runtime-utils.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations
//!
//! Command output goes to stdout so it can be consumed by shells
//! (`eval "$(runtime-utils detect -r java)"`); diagnostics go to stderr.

pub mod args;
pub mod commands;

pub use args::{CacertsArgs, Cli, Commands, DetectArgs, ListArgs, StartArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
