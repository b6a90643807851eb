//! Configuration schema and loading.
//!
//! - Schema definitions in [`schema`]
//! - File loading and external service files in [`loader`]
//!
//! The configuration has three tiers of runtime settings, consulted by
//! [`crate::detection::RuntimeResolver`] in this order:
//! 1. `services.<name>.runtimes.<runtime>`
//! 2. `autodetect.runtimes.<runtime>.<version>`
//! 3. `default.runtimes.<runtime>`
//!
//! # Example
//!
//! ```
//! use runtime_utils::config::parse_config;
//! use std::path::Path;
//!
//! let config = parse_config(
//!     "default:\n  runtimes:\n    java:\n      version: \"17\"\n",
//!     Path::new("inline.yaml"),
//! )
//! .unwrap();
//! assert_eq!(config.default.runtimes["java"].version, "17");
//! ```

pub mod loader;
pub mod schema;

pub use loader::{apply_env_file_shim, load_config, parse_config, DEFAULT_CONFIG_PATH};
pub use schema::{
    AutodetectSection, Config, DefaultSection, HealthCheckConfig, RuntimeSetting, ServiceConfig,
};
