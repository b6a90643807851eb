//! Environment access and path expansion.
//!
//! Runtime detection reads variables (for `env_var` settings and for
//! `$VAR` references in configured paths) through the [`EnvProvider`]
//! capability rather than the global process environment.

pub mod expand;
pub mod provider;

pub use expand::{expand_env, expand_path};
pub use provider::{EnvProvider, MapEnv, SystemEnv};
