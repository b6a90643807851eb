//! Supervised service startup.
//!
//! A supervised launch moves through these states:
//!
//! ```text
//! Starting -> Running -> HealthChecking -> Ready -> Exited
//!    |                        |
//!    +--------------------> Failed -> Terminating -> Exited
//! ```
//!
//! Health checks run one at a time, in configuration order. The first
//! failure (or unknown check kind) interrupts the process before the error
//! is returned. If the interrupt cannot be delivered, that failure is
//! reported with the original error as its source.

use super::health::HealthCheckRegistry;
use super::launcher::{launch_async, LaunchSpec, ProcessHandle};
use super::notify::{ReadinessNotifier, SystemdNotifier};
use crate::config::HealthCheckConfig;
use crate::error::{Result, RuntimeError};
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

/// How long to wait for an interrupted process to exit.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

const EXIT_POLL: Duration = Duration::from_millis(100);

/// Lifecycle state of a supervised launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Starting,
    Running,
    HealthChecking,
    Ready,
    Failed,
    Terminating,
    Exited,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::HealthChecking => "health-checking",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Terminating => "terminating",
            Self::Exited => "exited",
        };
        f.write_str(name)
    }
}

/// Delivers the rollback interrupt.
pub trait Signaller {
    fn interrupt(&self, pid: u32) -> std::io::Result<()>;
}

/// Sends `SIGINT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterruptSignaller;

impl Signaller for InterruptSignaller {
    fn interrupt(&self, pid: u32) -> std::io::Result<()> {
        let pid = libc::pid_t::try_from(pid).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "pid out of range")
        })?;
        // SAFETY: kill() has no memory-safety preconditions
        let rc = unsafe { libc::kill(pid, libc::SIGINT) };
        if rc == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }
}

/// Launches a service, health-checks it and reports readiness.
pub struct Supervisor {
    registry: HealthCheckRegistry,
    notifier: Box<dyn ReadinessNotifier>,
    signaller: Box<dyn Signaller>,
    grace_period: Duration,
    history: Vec<SupervisorState>,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self {
            registry: HealthCheckRegistry::default(),
            notifier: Box::new(SystemdNotifier::from_env()),
            signaller: Box::new(InterruptSignaller),
            grace_period: DEFAULT_GRACE_PERIOD,
            history: Vec::new(),
        }
    }
}

impl Supervisor {
    /// A supervisor with built-in checks, systemd notification and `SIGINT` rollback.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(mut self, registry: HealthCheckRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn ReadinessNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_signaller(mut self, signaller: Box<dyn Signaller>) -> Self {
        self.signaller = signaller;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Current state, if a launch has begun.
    pub fn state(&self) -> Option<SupervisorState> {
        self.history.last().copied()
    }

    /// Every state entered so far, in order.
    pub fn history(&self) -> &[SupervisorState] {
        &self.history
    }

    fn transition(&mut self, state: SupervisorState) {
        tracing::info!(%state, "supervisor state");
        self.history.push(state);
    }

    /// Launch, run all health checks and notify readiness.
    ///
    /// Returns the running process on success; the caller decides whether
    /// to [`wait`](Self::wait) for it.
    pub fn start(
        &mut self,
        spec: &LaunchSpec,
        checks: &[HealthCheckConfig],
    ) -> Result<ProcessHandle> {
        self.transition(SupervisorState::Starting);
        let handle = match launch_async(spec) {
            Ok(h) => h,
            Err(e) => {
                self.transition(SupervisorState::Failed);
                return Err(e);
            }
        };
        self.transition(SupervisorState::Running);

        self.transition(SupervisorState::HealthChecking);
        let pid = handle.pid();
        for check in checks {
            if let Err(cause) = self.registry.run(pid, check) {
                tracing::error!(pid, kind = %check.kind, "health check failed: {}", cause);
                return Err(self.rollback(handle, cause));
            }
        }

        self.transition(SupervisorState::Ready);
        if let Err(e) = self.notifier.notify_ready() {
            tracing::warn!("readiness notification failed: {}", e);
        }
        Ok(handle)
    }

    /// Block until the process exits.
    pub fn wait(&mut self, mut handle: ProcessHandle) -> Result<()> {
        let result = handle.wait_success();
        self.transition(SupervisorState::Exited);
        result
    }

    /// [`start`](Self::start) followed by [`wait`](Self::wait).
    pub fn run(&mut self, spec: &LaunchSpec, checks: &[HealthCheckConfig]) -> Result<()> {
        let handle = self.start(spec, checks)?;
        self.wait(handle)
    }

    /// Interrupt the process and return the error to report.
    fn rollback(&mut self, mut handle: ProcessHandle, cause: RuntimeError) -> RuntimeError {
        self.transition(SupervisorState::Failed);
        self.transition(SupervisorState::Terminating);

        let pid = handle.pid();
        if let Err(e) = self.signaller.interrupt(pid) {
            return RuntimeError::Signal {
                pid,
                message: e.to_string(),
                cause: Box::new(cause),
            };
        }

        let deadline = Instant::now() + self.grace_period;
        loop {
            match handle.try_wait() {
                Ok(Some(status)) => {
                    tracing::info!(pid, %status, "process exited after interrupt");
                    self.transition(SupervisorState::Exited);
                    break;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL),
                Ok(None) => {
                    tracing::warn!(pid, "process still running after interrupt");
                    break;
                }
                Err(e) => {
                    tracing::warn!(pid, "cannot wait for interrupted process: {}", e);
                    break;
                }
            }
        }
        cause
    }
}
