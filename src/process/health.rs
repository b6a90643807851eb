//! Post-launch health checks.
//!
//! Checks are looked up by kind in a [`HealthCheckRegistry`]. Each kind
//! parses its own parameters from the untyped [`HealthCheckConfig::params`]
//! bag. The only built-in kind is `port`, which waits until the process owns
//! a socket bound to a given port.

use super::sockets::{ProcFs, SocketProtocol};
use crate::config::HealthCheckConfig;
use crate::error::{Result, RuntimeError};
use std::collections::BTreeMap;
use std::thread;
use std::time::{Duration, Instant};

/// Kind name of [`PortHealthCheck`].
pub const PORT_CHECK: &str = "port";

/// Parameter names understood by the port check.
pub const PORT_PARAM: &str = "port";
pub const PROTOCOL_PARAM: &str = "protocol";
pub const TIMEOUT_PARAM: &str = "timeout";

/// Seconds to wait when `timeout` is not given.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Delay between two probes.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A readiness probe run against a freshly started process.
pub trait HealthCheck {
    /// Kind name used in configuration.
    fn kind(&self) -> &'static str;

    /// Reject malformed parameters without probing anything.
    fn validate(&self, config: &HealthCheckConfig) -> Result<()>;

    /// Validate, then probe `pid` until the check passes or times out.
    fn check(&self, pid: u32, config: &HealthCheckConfig) -> Result<()>;
}

/// Parsed parameters of a port check.
#[derive(Debug, Clone, PartialEq)]
pub struct PortCheckParams {
    pub port: u16,
    pub protocol: SocketProtocol,
    pub timeout: Duration,
}

impl PortCheckParams {
    /// Parse `port` (required), `protocol` and `timeout` (seconds).
    pub fn from_config(config: &HealthCheckConfig) -> Result<Self> {
        let port = match config.param_str(PORT_PARAM) {
            None => return Err(invalid(format!("missing {} parameter", PORT_PARAM))),
            Some(raw) => raw
                .map_err(invalid)?
                .trim()
                .parse::<u16>()
                .map_err(|e| invalid(format!("parameter {} has invalid value: {}", PORT_PARAM, e)))?,
        };

        let protocol = match config.param_str(PROTOCOL_PARAM) {
            None => SocketProtocol::Tcp,
            Some(raw) => raw.map_err(invalid)?.trim().parse()?,
        };

        let timeout_secs = match config.param_str(TIMEOUT_PARAM) {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => raw.map_err(invalid)?.trim().parse::<u64>().map_err(|e| {
                invalid(format!(
                    "parameter {} has invalid value: {}",
                    TIMEOUT_PARAM, e
                ))
            })?,
        };

        let timeout = Duration::from_secs(timeout_secs);
        if Instant::now().checked_add(timeout).is_none() {
            return Err(invalid(format!(
                "parameter {} is out of range: {}",
                TIMEOUT_PARAM, timeout_secs
            )));
        }

        Ok(Self {
            port,
            protocol,
            timeout,
        })
    }
}

fn invalid(message: String) -> RuntimeError {
    RuntimeError::Validation { message }
}

/// Waits until a process owns a socket on a given port.
#[derive(Debug, Clone)]
pub struct PortHealthCheck {
    procfs: ProcFs,
    poll_interval: Duration,
}

impl Default for PortHealthCheck {
    fn default() -> Self {
        Self::new(ProcFs::default())
    }
}

impl PortHealthCheck {
    /// Create a port check reading the given procfs.
    pub fn new(procfs: ProcFs) -> Self {
        Self {
            procfs,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Poll until `deadline`. The deadline is fixed by the caller.
    pub fn wait_for_port(&self, pid: u32, params: &PortCheckParams, deadline: Instant) -> Result<()> {
        while Instant::now() < deadline {
            match self.procfs.sockets_for_pid(pid, params.protocol) {
                Ok(sockets) => {
                    if let Some(socket) = sockets.iter().find(|s| s.port == params.port) {
                        tracing::info!(pid, port = params.port, ip = %socket.ip, "port is open");
                        return Ok(());
                    }
                }
                Err(e) => {
                    tracing::warn!(pid, protocol = %params.protocol, "error reading sockets, retrying: {}", e);
                }
            }
            thread::sleep(self.poll_interval);
        }
        Err(RuntimeError::HealthCheck {
            message: format!(
                "port {} not open after {} seconds",
                params.port,
                params.timeout.as_secs()
            ),
        })
    }
}

impl HealthCheck for PortHealthCheck {
    fn kind(&self) -> &'static str {
        PORT_CHECK
    }

    fn validate(&self, config: &HealthCheckConfig) -> Result<()> {
        PortCheckParams::from_config(config).map(|_| ())
    }

    fn check(&self, pid: u32, config: &HealthCheckConfig) -> Result<()> {
        let params = PortCheckParams::from_config(config)?;
        tracing::debug!(pid, port = params.port, protocol = %params.protocol, timeout = ?params.timeout, "waiting for port");
        let deadline = Instant::now().checked_add(params.timeout).ok_or_else(|| {
            invalid(format!(
                "parameter {} is out of range: {}",
                TIMEOUT_PARAM,
                params.timeout.as_secs()
            ))
        })?;
        self.wait_for_port(pid, &params, deadline)
    }
}

/// Health check implementations keyed by kind.
pub struct HealthCheckRegistry {
    checks: BTreeMap<&'static str, Box<dyn HealthCheck>>,
}

impl Default for HealthCheckRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(PortHealthCheck::default()));
        registry
    }
}

impl HealthCheckRegistry {
    /// A registry with the built-in checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with no checks.
    pub fn empty() -> Self {
        Self {
            checks: BTreeMap::new(),
        }
    }

    /// Add or replace the check for its kind.
    pub fn register(&mut self, check: Box<dyn HealthCheck>) {
        self.checks.insert(check.kind(), check);
    }

    /// Look up the check for `kind`.
    pub fn get(&self, kind: &str) -> Result<&dyn HealthCheck> {
        self.checks
            .get(kind)
            .map(|c| c.as_ref())
            .ok_or_else(|| RuntimeError::UnknownHealthCheck {
                kind: kind.to_string(),
            })
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.checks.keys().copied().collect()
    }

    /// Run one configured check against `pid`.
    pub fn run(&self, pid: u32, config: &HealthCheckConfig) -> Result<()> {
        let check = self.get(&config.kind)?;
        check.validate(config)?;
        check.check(pid, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port_config(port: &str) -> HealthCheckConfig {
        HealthCheckConfig::new(PORT_CHECK).with_param(PORT_PARAM, port)
    }

    #[test]
    fn params_defaults() {
        let params = PortCheckParams::from_config(&port_config("8080")).unwrap();
        assert_eq!(params.port, 8080);
        assert_eq!(params.protocol, SocketProtocol::Tcp);
        assert_eq!(params.timeout, Duration::from_secs(60));
    }

    #[test]
    fn params_explicit_values() {
        let config = port_config("53")
            .with_param(PROTOCOL_PARAM, "udp6")
            .with_param(TIMEOUT_PARAM, "5");
        let params = PortCheckParams::from_config(&config).unwrap();
        assert_eq!(params.protocol, SocketProtocol::Udp6);
        assert_eq!(params.timeout, Duration::from_secs(5));
    }

    #[test]
    fn params_accept_integer_scalars() {
        let config: HealthCheckConfig =
            serde_yaml::from_str("type: port\nparams:\n  port: 9092\n  timeout: 3\n").unwrap();
        let params = PortCheckParams::from_config(&config).unwrap();
        assert_eq!(params.port, 9092);
        assert_eq!(params.timeout, Duration::from_secs(3));
    }

    #[test]
    fn missing_port_is_validation_error() {
        let err = PortCheckParams::from_config(&HealthCheckConfig::new(PORT_CHECK)).unwrap_err();
        assert!(matches!(err, RuntimeError::Validation { .. }));
        assert!(err.to_string().contains("missing port"));
    }

    #[test]
    fn non_numeric_port_is_validation_error() {
        let err = PortCheckParams::from_config(&port_config("http")).unwrap_err();
        assert!(matches!(err, RuntimeError::Validation { .. }));
    }

    #[test]
    fn out_of_range_port_is_validation_error() {
        assert!(PortCheckParams::from_config(&port_config("70000")).is_err());
    }

    #[test]
    fn invalid_protocol_and_timeout_are_validation_errors() {
        let bad_protocol = port_config("80").with_param(PROTOCOL_PARAM, "sctp");
        assert!(matches!(
            PortCheckParams::from_config(&bad_protocol),
            Err(RuntimeError::Validation { .. })
        ));

        let bad_timeout = port_config("80").with_param(TIMEOUT_PARAM, "soon");
        assert!(matches!(
            PortCheckParams::from_config(&bad_timeout),
            Err(RuntimeError::Validation { .. })
        ));
    }

    #[test]
    fn unrepresentable_timeout_is_a_validation_error() {
        let huge = port_config("80").with_param(TIMEOUT_PARAM, u64::MAX.to_string());
        assert!(matches!(
            PortCheckParams::from_config(&huge),
            Err(RuntimeError::Validation { .. })
        ));

        let err = PortHealthCheck::default().check(1, &huge).unwrap_err();
        assert!(matches!(err, RuntimeError::Validation { .. }));
    }

    #[test]
    fn check_rejects_bad_params_before_polling() {
        let start = Instant::now();
        let err = PortHealthCheck::default()
            .check(std::process::id(), &HealthCheckConfig::new(PORT_CHECK))
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Validation { .. }));
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn check_succeeds_for_own_listener() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port().to_string();
        let config = port_config(&port).with_param(TIMEOUT_PARAM, "2");

        let start = Instant::now();
        PortHealthCheck::default()
            .check(std::process::id(), &config)
            .unwrap();
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn check_times_out_after_full_timeout() {
        let port = {
            let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            probe.local_addr().unwrap().port().to_string()
        };
        let config = port_config(&port).with_param(TIMEOUT_PARAM, "2");

        let start = Instant::now();
        let err = PortHealthCheck::default()
            .check(std::process::id(), &config)
            .unwrap_err();
        let elapsed = start.elapsed();

        assert!(err.to_string().contains("not open after 2 seconds"));
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(4));
    }

    #[test]
    fn registry_has_port_check() {
        let registry = HealthCheckRegistry::new();
        assert_eq!(registry.kinds(), vec![PORT_CHECK]);
        assert_eq!(registry.get("port").unwrap().kind(), PORT_CHECK);
    }

    #[test]
    fn registry_unknown_kind_is_distinct_error() {
        let registry = HealthCheckRegistry::new();
        let err = registry
            .run(std::process::id(), &HealthCheckConfig::new("http"))
            .err()
            .unwrap();
        assert!(matches!(err, RuntimeError::UnknownHealthCheck { ref kind } if kind == "http"));
    }

    #[test]
    fn empty_registry_knows_nothing() {
        assert!(HealthCheckRegistry::empty().get(PORT_CHECK).is_err());
    }
}
