//! The `start` command: launch a service on its detected runtime.
//!
//! The resolved home is added to the service environment under the
//! runtime's variable name (e.g. `JAVA_HOME`). Without `--supervise` the
//! service runs in the foreground until it exits. With `--supervise` the
//! health checks run first and systemd is told when the service is ready.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::args::StartArgs;
use crate::config::{Config, ServiceConfig};
use crate::detection::{env_name, RuntimeResolver};
use crate::error::{Result, RuntimeError};
use crate::process::{launch_sync, LaunchSpec};

use super::dispatcher::{load, Command, CommandResult};

/// Look up the service definition to start.
pub fn find_service<'a>(config: &'a Config, service: &str) -> Result<&'a ServiceConfig> {
    config
        .services
        .get(service)
        .ok_or_else(|| RuntimeError::ServiceNotFound {
            service: service.to_string(),
        })
}

/// Build the launch description for `service` with `home` exported.
pub fn launch_spec(
    config: &Config,
    service: &str,
    service_config: &ServiceConfig,
    runtime: &str,
    home: &Path,
) -> Result<LaunchSpec> {
    let executable = service_config
        .executable
        .clone()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| RuntimeError::Validation {
            message: format!("service '{}' has no executable", service),
        })?;

    let mut spec = LaunchSpec::new(executable);
    for arg in &service_config.executable_args {
        spec = spec.arg(arg.clone());
    }
    for (key, value) in &service_config.env_vars {
        spec = spec.env(key.clone(), value.clone());
    }
    spec = spec.env(
        env_name(config, service, runtime),
        home.to_string_lossy().into_owned(),
    );
    Ok(spec)
}

/// The start command implementation.
pub struct StartCommand {
    config_path: PathBuf,
    args: StartArgs,
}

impl StartCommand {
    /// Create a new start command.
    pub fn new(config_path: &Path, args: StartArgs) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            args,
        }
    }

    #[cfg(unix)]
    fn supervise(&self, spec: &LaunchSpec, service: &ServiceConfig) -> Result<()> {
        crate::process::Supervisor::new().run(spec, &service.health_checks)
    }

    #[cfg(not(unix))]
    fn supervise(&self, _spec: &LaunchSpec, _service: &ServiceConfig) -> Result<()> {
        Err(RuntimeError::Validation {
            message: "--supervise is only supported on Unix".to_string(),
        })
    }
}

impl Command for StartCommand {
    fn execute(&self, _out: &mut dyn Write, _err: &mut dyn Write) -> Result<CommandResult> {
        let config = load(&self.config_path)?;
        let StartArgs {
            service, runtime, ..
        } = &self.args;
        let service_config = find_service(&config, service)?;

        let home = RuntimeResolver::new(&config).resolve(service, runtime)?;
        let spec = launch_spec(&config, service, service_config, runtime, &home)?;
        tracing::info!(service = %service, executable = %spec.executable, "starting service");

        if self.args.supervise {
            self.supervise(&spec, service_config)?;
        } else {
            launch_sync(&spec)?;
        }
        Ok(CommandResult::success())
    }
}
