//! Service launching and supervision.
//!
//! - [`launcher`] - spawn a process with an explicit environment
//! - [`sockets`] - `/proc` socket table introspection
//! - [`health`] - health check registry and the `port` check
//! - [`notify`] - readiness notification (systemd)
//! - [`supervisor`] - launch, check, notify, roll back

pub mod health;
pub mod launcher;
#[cfg(unix)]
pub mod notify;
pub mod sockets;
#[cfg(unix)]
pub mod supervisor;

pub use health::{HealthCheck, HealthCheckRegistry, PortCheckParams, PortHealthCheck};
pub use launcher::{launch_async, launch_sync, LaunchSpec, ProcessHandle};
#[cfg(unix)]
pub use notify::{ReadinessNotifier, SystemdNotifier};
pub use sockets::{ProcFs, SocketInfo, SocketProtocol};
#[cfg(unix)]
pub use supervisor::{InterruptSignaller, Signaller, Supervisor, SupervisorState};
