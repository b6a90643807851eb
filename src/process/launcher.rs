//! Process launching with an explicit environment.
//!
//! The child sees exactly the variables it is given: the parent's
//! environment is cleared before spawning.

use crate::error::{Result, RuntimeError};
use std::collections::HashMap;
use std::process::{Child, Command, ExitStatus};

/// What to launch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchSpec {
    /// Program path. A bare name is looked up on the child's `PATH`.
    pub executable: String,

    /// Arguments passed to the program.
    pub args: Vec<String>,

    /// The complete environment of the child.
    pub env: HashMap<String, String>,
}

impl LaunchSpec {
    /// Create a spec with no arguments and an empty environment.
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            ..Default::default()
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.args);
        cmd.env_clear();
        cmd.envs(&self.env);
        cmd
    }
}

/// A running child process.
#[derive(Debug)]
pub struct ProcessHandle {
    executable: String,
    child: Child,
}

impl ProcessHandle {
    /// OS process id.
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// The launched program.
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Check for exit without blocking.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        Ok(self.child.try_wait()?)
    }

    /// Block until the process exits.
    pub fn wait(&mut self) -> Result<ExitStatus> {
        Ok(self.child.wait()?)
    }

    /// Block until exit and turn a non-zero exit into an error.
    pub fn wait_success(&mut self) -> Result<()> {
        let status = self.wait()?;
        if status.success() {
            return Ok(());
        }
        Err(RuntimeError::ProcessExited {
            executable: self.executable.clone(),
            code: status.code(),
        })
    }

    /// Forcefully terminate the process.
    pub fn kill(&mut self) -> Result<()> {
        Ok(self.child.kill()?)
    }
}

/// Start a process and return immediately.
pub fn launch_async(spec: &LaunchSpec) -> Result<ProcessHandle> {
    let child = spec.command().spawn().map_err(|e| RuntimeError::Spawn {
        executable: spec.executable.clone(),
        source: e,
    })?;
    tracing::info!(executable = %spec.executable, pid = child.id(), "process started");
    Ok(ProcessHandle {
        executable: spec.executable.clone(),
        child,
    })
}

/// Start a process and block until it exits.
pub fn launch_sync(spec: &LaunchSpec) -> Result<()> {
    launch_async(spec)?.wait_success()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn launch_sync_succeeds() {
        let spec = LaunchSpec::new("/bin/sh").arg("-c").arg("exit 0");
        launch_sync(&spec).unwrap();
    }

    #[test]
    fn launch_sync_surfaces_exit_code() {
        let spec = LaunchSpec::new("/bin/sh").arg("-c").arg("exit 3");
        let err = launch_sync(&spec).unwrap_err();
        match err {
            RuntimeError::ProcessExited { code, .. } => assert_eq!(code, Some(3)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn launch_missing_executable_is_spawn_error() {
        let spec = LaunchSpec::new("/nonexistent/definitely/not/here");
        let err = launch_async(&spec).unwrap_err();
        assert!(matches!(err, RuntimeError::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/definitely/not/here"));
    }

    #[test]
    fn child_receives_exactly_the_given_environment() {
        std::env::set_var("RUNTIME_UTILS_LAUNCH_LEAK", "1");
        let spec = LaunchSpec::new("/bin/sh")
            .arg("-c")
            .arg(r#"[ "$GIVEN" = "yes" ] && [ -z "$RUNTIME_UTILS_LAUNCH_LEAK" ]"#)
            .env("GIVEN", "yes");
        let result = launch_sync(&spec);
        std::env::remove_var("RUNTIME_UTILS_LAUNCH_LEAK");
        result.unwrap();
    }

    #[test]
    fn launch_async_returns_live_handle() {
        let spec = LaunchSpec::new("/bin/sleep").arg("5");
        let mut handle = launch_async(&spec).unwrap();
        assert!(handle.pid() > 0);
        assert!(handle.try_wait().unwrap().is_none());
        handle.kill().unwrap();
        handle.wait().unwrap();
    }
}
