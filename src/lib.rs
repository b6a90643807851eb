//! runtime-utils - Locate language runtimes and start services on them.
//!
//! Hosts often carry several installations of the same runtime (a couple of
//! JDKs, a few Python virtualenvs). A YAML configuration says which version
//! each service wants and where to look; this crate resolves the matching
//! runtime home, finds the Java trust store under it, and can launch the
//! service with the home exported, health-check it and notify systemd.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration schema and loading
//! - [`detection`] - Runtime home resolution and trust store discovery
//! - [`environment`] - Environment variable access and path expansion
//! - [`error`] - Error types and result aliases
//! - [`process`] - Launching, health checks and supervision
//! - [`sys`] - File system helpers (globbing, tree walks)
//!
//! # Example
//!
//! ```
//! use runtime_utils::config::parse_config;
//! use runtime_utils::detection::RuntimeResolver;
//! use runtime_utils::environment::MapEnv;
//! use std::path::Path;
//!
//! let yaml = "default:\n  runtimes:\n    java:\n      version: \"17\"\n";
//! let config = parse_config(yaml, Path::new("inline.yaml")).unwrap();
//! let env = MapEnv::new();
//! let resolver = RuntimeResolver::with_env(&config, &env);
//!
//! // A version is configured but no location matches.
//! let err = resolver.resolve("", "java").unwrap_err();
//! assert!(err.to_string().contains("'17'"));
//! ```

pub mod cli;
pub mod config;
pub mod detection;
pub mod environment;
pub mod error;
pub mod process;
pub mod sys;

pub use error::{Result, RuntimeError};
