//! Configuration schema definitions.
//!
//! These structs map one-to-one onto the YAML configuration document.
//! Decoding is strict: unknown fields are rejected.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Fallback runtime settings used when a service does not pin one.
    pub default: DefaultSection,

    /// Per-version search locations.
    pub autodetect: AutodetectSection,

    /// Service definitions
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, ServiceConfig>,
}

/// The `default:` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultSection {
    pub runtimes: BTreeMap<String, RuntimeSetting>,
}

/// The `autodetect:` section: `runtimes[name][version]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutodetectSection {
    pub runtimes: BTreeMap<String, BTreeMap<String, RuntimeSetting>>,
}

/// How to find one runtime.
///
/// Strategies are tried in a fixed order: `override_path`, then `env_var`,
/// then each of `paths`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeSetting {
    /// Required runtime version (a free-form label, e.g. "17" or "3.9")
    pub version: String,

    /// Explicit runtime home
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_path: Option<String>,

    /// Environment variable holding a runtime home
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_var: Option<String>,

    /// Literal paths or glob patterns, tried in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
}

/// A service that runs on a detected runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Runtime settings keyed by runtime name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub runtimes: BTreeMap<String, RuntimeSetting>,

    /// External file holding this service's definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Program to launch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,

    /// Arguments passed to the program
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub executable_args: Vec<String>,

    /// The complete environment of the launched program
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub env_vars: HashMap<String, String>,

    /// Shell file sourced before the program starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_vars_file: Option<String>,

    /// Checks run after launch, in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub health_checks: Vec<HealthCheckConfig>,
}

/// One post-launch health check.
///
/// `params` is an untyped bag; each check kind parses its own parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthCheckConfig {
    /// Check kind, e.g. "port"
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, serde_yaml::Value>,
}

impl HealthCheckConfig {
    /// Create a check of the given kind with no parameters.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: HashMap::new(),
        }
    }

    /// Add a string parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .insert(name.into(), serde_yaml::Value::String(value.into()));
        self
    }

    /// Read a scalar parameter as text.
    ///
    /// Strings are returned as-is, numbers and booleans are rendered. `None`
    /// means the parameter is absent; `Some(Err)` means it is not a scalar.
    pub fn param_str(&self, name: &str) -> Option<std::result::Result<String, String>> {
        let value = self.params.get(name)?;
        Some(match value {
            serde_yaml::Value::String(s) => Ok(s.clone()),
            serde_yaml::Value::Number(n) => Ok(n.to_string()),
            serde_yaml::Value::Bool(b) => Ok(b.to_string()),
            other => Err(format!("parameter {} has invalid value: {:?}", name, other)),
        })
    }
}
