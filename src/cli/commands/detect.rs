//! The `detect` command: print a runtime home as a shell export.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::args::DetectArgs;
use crate::detection::{env_name, RuntimeResolver};
use crate::error::Result;

use super::dispatcher::{load, Command, CommandResult};

/// The detect command implementation.
pub struct DetectCommand {
    config_path: PathBuf,
    args: DetectArgs,
}

impl DetectCommand {
    /// Create a new detect command.
    pub fn new(config_path: &Path, args: DetectArgs) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            args,
        }
    }
}

impl Command for DetectCommand {
    fn execute(&self, out: &mut dyn Write, _err: &mut dyn Write) -> Result<CommandResult> {
        let config = load(&self.config_path)?;
        let home = RuntimeResolver::new(&config).resolve(&self.args.service, &self.args.runtime)?;
        let name = env_name(&config, &self.args.service, &self.args.runtime);

        writeln!(out, "export {}={}", name, home.display())?;
        Ok(CommandResult::success())
    }
}
