//! Tiered runtime resolution.
//!
//! Resolves a runtime home for an optional service using the priority chain:
//! 1. Service tier (`services.<service>.runtimes.<runtime>`)
//! 2. Version lookup (fatal when no version is configured)
//! 3. Autodetect tier (`autodetect.runtimes.<runtime>.<version>`)
//! 4. Default tier (`default.runtimes.<runtime>`)

use super::strategy::detect_path;
use crate::config::{Config, RuntimeSetting};
use crate::environment::{EnvProvider, SystemEnv};
use crate::error::{Result, RuntimeError};
use std::fmt;
use std::path::PathBuf;

/// Which configuration tier produced a runtime home.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    Service,
    Autodetect,
    Default,
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => write!(f, "service"),
            Self::Autodetect => write!(f, "autodetect"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// A resolved runtime home with the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRuntime {
    pub home: PathBuf,
    pub tier: ResolutionTier,
}

/// Executable basename to look for under `bin/`.
pub fn exe_name(runtime: &str) -> &str {
    match runtime {
        "java" => "java",
        "python" => "python",
        other => other,
    }
}

/// Environment variable name that should carry the resolved home.
///
/// The service's `env_var` wins, then the default runtime's, then a
/// conventional name.
pub fn env_name(config: &Config, service: &str, runtime: &str) -> String {
    let configured = |setting: Option<&RuntimeSetting>| {
        setting
            .and_then(|s| s.env_var.clone())
            .filter(|v| !v.is_empty())
    };

    if !service.is_empty() {
        let service_setting = config
            .services
            .get(service)
            .and_then(|s| s.runtimes.get(runtime));
        if let Some(name) = configured(service_setting) {
            return name;
        }
    }
    if let Some(name) = configured(config.default.runtimes.get(runtime)) {
        return name;
    }
    match runtime.to_lowercase().as_str() {
        "java" => "JAVA_HOME".to_string(),
        "python" => "VIRTUAL_ENV".to_string(),
        _ => format!("{}_HOME", runtime.to_uppercase()),
    }
}

/// Resolves runtime homes against a loaded [`Config`].
///
/// # Example
///
/// ```
/// use runtime_utils::config::Config;
/// use runtime_utils::detection::RuntimeResolver;
/// use runtime_utils::environment::MapEnv;
///
/// let config = Config::default();
/// let env = MapEnv::new();
/// let resolver = RuntimeResolver::with_env(&config, &env);
/// // Nothing configured: the version lookup fails.
/// assert!(resolver.resolve("", "java").is_err());
/// ```
pub struct RuntimeResolver<'a> {
    config: &'a Config,
    env: &'a dyn EnvProvider,
}

impl<'a> RuntimeResolver<'a> {
    /// Create a resolver reading the real process environment.
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            env: &SystemEnv,
        }
    }

    /// Create a resolver with a custom environment (for testing).
    pub fn with_env(config: &'a Config, env: &'a dyn EnvProvider) -> Self {
        Self { config, env }
    }

    /// Resolve the home of `runtime`, optionally for `service` (empty = none).
    pub fn resolve(&self, service: &str, runtime: &str) -> Result<PathBuf> {
        self.resolve_detailed(service, runtime).map(|r| r.home)
    }

    /// Resolve and report which tier matched.
    pub fn resolve_detailed(&self, service: &str, runtime: &str) -> Result<ResolvedRuntime> {
        let exe = exe_name(runtime);

        // 1) Service-level detection
        if let Some(home) = self.detect_service_level(service, runtime, exe) {
            return Ok(self.found(home, ResolutionTier::Service, service, runtime));
        }

        // 2) Determine version
        let version = self.detect_version(service, runtime)?;

        // 3) Autodetect per-version
        if let Some(home) = self.detect_autodetect(runtime, &version, exe) {
            return Ok(self.found(home, ResolutionTier::Autodetect, service, runtime));
        }

        // 4) Default fallback
        if let Some(home) = self.detect_default(runtime, exe) {
            return Ok(self.found(home, ResolutionTier::Default, service, runtime));
        }

        Err(RuntimeError::RuntimeNotFound {
            runtime: runtime.to_string(),
            service: service.to_string(),
            version,
        })
    }

    fn found(
        &self,
        home: PathBuf,
        tier: ResolutionTier,
        service: &str,
        runtime: &str,
    ) -> ResolvedRuntime {
        tracing::debug!(%tier, service, runtime, home = %home.display(), "runtime resolved");
        ResolvedRuntime { home, tier }
    }

    fn service_setting(&self, service: &str, runtime: &str) -> Option<&'a RuntimeSetting> {
        if service.is_empty() {
            return None;
        }
        self.config.services.get(service)?.runtimes.get(runtime)
    }

    fn detect_service_level(&self, service: &str, runtime: &str, exe: &str) -> Option<PathBuf> {
        let setting = self.service_setting(service, runtime)?;
        detect_path(setting, exe, self.env)
    }

    fn detect_version(&self, service: &str, runtime: &str) -> Result<String> {
        let setting = if service.is_empty() {
            self.config.default.runtimes.get(runtime)
        } else {
            self.service_setting(service, runtime)
        };
        let version = setting.map(|s| s.version.clone()).unwrap_or_default();

        if version.is_empty() {
            return Err(RuntimeError::VersionNotSpecified {
                service: service.to_string(),
                runtime: runtime.to_string(),
            });
        }
        Ok(version)
    }

    fn detect_autodetect(&self, runtime: &str, version: &str, exe: &str) -> Option<PathBuf> {
        let setting = self.config.autodetect.runtimes.get(runtime)?.get(version)?;
        detect_path(setting, exe, self.env)
    }

    fn detect_default(&self, runtime: &str, exe: &str) -> Option<PathBuf> {
        let setting = self.config.default.runtimes.get(runtime)?;
        detect_path(setting, exe, self.env)
    }
}
