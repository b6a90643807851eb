//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, Config};
use crate::error::Result;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `out` - Machine-readable output (stdout)
    /// * `err` - Per-entry diagnostics (stderr)
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, out: &mut dyn Write, err: &mut dyn Write) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }
}

/// Load the configuration a command operates on.
pub(crate) fn load(config_path: &Path) -> Result<Config> {
    tracing::debug!(path = %config_path.display(), "loading configuration");
    load_config(config_path)
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config_path: PathBuf,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given configuration file.
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Dispatch and execute a command.
    pub fn dispatch(
        &self,
        cli: &Cli,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<CommandResult> {
        match &cli.command {
            Commands::Detect(args) => {
                let cmd = super::detect::DetectCommand::new(&self.config_path, args.clone());
                cmd.execute(out, err)
            }
            Commands::List(args) => {
                let cmd = super::list::ListCommand::new(&self.config_path, args.clone());
                cmd.execute(out, err)
            }
            Commands::Cacerts(args) => {
                let cmd = super::cacerts::CacertsCommand::new(&self.config_path, args.clone());
                cmd.execute(out, err)
            }
            Commands::Start(args) => {
                let cmd = super::start::StartCommand::new(&self.config_path, args.clone());
                cmd.execute(out, err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn dispatch_reports_missing_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yaml");
        let cli = Cli::try_parse_from(["runtime-utils", "list"]).unwrap();
        let dispatcher = CommandDispatcher::new(path);

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let result = dispatcher.dispatch(&cli, &mut out, &mut err);
        assert!(matches!(
            result,
            Err(crate::error::RuntimeError::ConfigNotFound { .. })
        ));
    }
}
