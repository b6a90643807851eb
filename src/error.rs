//! Error types for runtime-utils operations.
//!
//! This module defines [`RuntimeError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Detection steps return `Option` for "not here, try the next one"; an
//!   error is only produced once every tier or search location is exhausted
//! - Use `RuntimeError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `RuntimeError::Other`) for unexpected errors
//! - Rollback failures wrap the error that triggered the rollback

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for runtime-utils operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Service is not defined in the configuration.
    #[error("service '{service}' not found in config")]
    ServiceNotFound { service: String },

    /// No version configured for the runtime at the tier being consulted.
    #[error("{}", version_not_specified(.service, .runtime))]
    VersionNotSpecified { service: String, runtime: String },

    /// Every resolution tier was exhausted without finding a runtime home.
    #[error("could not detect runtime '{runtime}' for service '{service}' (version '{version}')")]
    RuntimeNotFound {
        runtime: String,
        service: String,
        version: String,
    },

    /// No Java home was given and none of the system trust stores exist.
    #[error("JAVA_HOME is empty and cacerts not found in system paths")]
    CaCertsEmptyHome,

    /// The Java home and the system paths were searched without success.
    #[error("unable to find cacerts at JAVA_HOME={} and in system paths", .home.display())]
    CaCertsNotFound { home: PathBuf },

    /// Malformed health check parameters.
    #[error("Invalid health check parameters: {message}")]
    Validation { message: String },

    /// The process could not be started.
    #[error("failed to start '{executable}': {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited unsuccessfully.
    #[error("'{executable}' exited with code {code:?}")]
    ProcessExited {
        executable: String,
        code: Option<i32>,
    },

    /// A health check did not pass.
    #[error("health check failed: {message}")]
    HealthCheck { message: String },

    /// A health check kind with no registered implementation.
    #[error("unknown health check type: {kind}")]
    UnknownHealthCheck { kind: String },

    /// Interrupting the process during rollback failed.
    #[error("failed to send interrupt signal to process {pid}: {message}")]
    Signal {
        pid: u32,
        message: String,
        #[source]
        cause: Box<RuntimeError>,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn version_not_specified(service: &str, runtime: &str) -> String {
    if service.is_empty() {
        format!("default version not specified for runtime '{}'", runtime)
    } else {
        format!(
            "version not specified for service '{}' runtime '{}'",
            service, runtime
        )
    }
}

/// Result type alias for runtime-utils operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
