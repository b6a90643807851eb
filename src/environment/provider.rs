//! Access to the process environment as an injectable capability.
//!
//! Detection never reads `std::env` directly; it asks an [`EnvProvider`].
//! Production code uses [`SystemEnv`], tests use [`MapEnv`] so that they
//! stay deterministic without mutating the real process environment.

use std::collections::HashMap;
use std::path::PathBuf;

/// Source of environment variables and the user's home directory.
pub trait EnvProvider {
    /// Look up a variable. Unset and non-UTF-8 values are `None`.
    fn var(&self, key: &str) -> Option<String>;

    /// The current user's home directory, if known.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvProvider for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

/// A fixed, in-memory environment.
///
/// # Example
///
/// ```
/// use runtime_utils::environment::{EnvProvider, MapEnv};
///
/// let env = MapEnv::new()
///     .with_var("JAVA_HOME", "/opt/jdk")
///     .with_home("/home/svc");
/// assert_eq!(env.var("JAVA_HOME").as_deref(), Some("/opt/jdk"));
/// assert!(env.var("PATH").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
    home: Option<PathBuf>,
}

impl MapEnv {
    /// Create an empty environment with no home directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Set the home directory.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }
}

impl EnvProvider for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }
}
