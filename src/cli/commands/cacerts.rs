//! The `cacerts` command: print the trust store of the detected Java.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::args::CacertsArgs;
use crate::detection::{find_cacerts, CaCertsOptions, RuntimeResolver};
use crate::error::Result;

use super::dispatcher::{load, Command, CommandResult};

/// The cacerts command implementation.
pub struct CacertsCommand {
    config_path: PathBuf,
    args: CacertsArgs,
    options: CaCertsOptions,
}

impl CacertsCommand {
    /// Create a new cacerts command searching the standard system paths.
    pub fn new(config_path: &Path, args: CacertsArgs) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            args,
            options: CaCertsOptions::default(),
        }
    }

    /// Override the trust store search options.
    pub fn with_options(mut self, options: CaCertsOptions) -> Self {
        self.options = options;
        self
    }
}

impl Command for CacertsCommand {
    fn execute(&self, out: &mut dyn Write, _err: &mut dyn Write) -> Result<CommandResult> {
        let config = load(&self.config_path)?;
        let java_home = RuntimeResolver::new(&config).resolve(&self.args.service, "java")?;
        let cacerts = find_cacerts(&java_home, &self.options)?;

        writeln!(out, "{}", cacerts.display())?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use std::fs;
    use tempfile::TempDir;

    fn java_config(temp: &TempDir, with_store: bool) -> (PathBuf, PathBuf) {
        let home = temp.path().join("jdk");
        fs::create_dir_all(home.join("bin")).unwrap();
        fs::write(home.join("bin/java"), "").unwrap();
        if with_store {
            fs::create_dir_all(home.join("lib/security")).unwrap();
            fs::write(home.join("lib/security/cacerts"), "store").unwrap();
        }
        let config = temp.path().join("config.yaml");
        fs::write(
            &config,
            format!(
                "default:\n  runtimes:\n    java:\n      version: \"17\"\n      override_path: {}\n",
                home.display()
            ),
        )
        .unwrap();
        (config, home)
    }

    #[test]
    fn prints_store_under_java_home() {
        let temp = TempDir::new().unwrap();
        let (config, home) = java_config(&temp, true);
        let cmd = CacertsCommand::new(&config, CacertsArgs::default())
            .with_options(CaCertsOptions::no_system_paths());

        let (mut out, mut err) = (Vec::new(), Vec::new());
        cmd.execute(&mut out, &mut err).unwrap();

        let printed = PathBuf::from(String::from_utf8(out).unwrap().trim_end());
        assert_eq!(
            printed,
            home.join("lib/security/cacerts").canonicalize().unwrap()
        );
    }

    #[test]
    fn missing_store_is_an_error() {
        let temp = TempDir::new().unwrap();
        let (config, _) = java_config(&temp, false);
        let cmd = CacertsCommand::new(&config, CacertsArgs::default())
            .with_options(CaCertsOptions::no_system_paths());

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let result = cmd.execute(&mut out, &mut err);
        assert!(matches!(result, Err(RuntimeError::CaCertsNotFound { .. })));
        assert!(out.is_empty());
    }
}
