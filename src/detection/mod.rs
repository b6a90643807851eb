//! Runtime home detection.
//!
//! - [`strategy`] - override / env var / glob search for one runtime setting
//! - [`resolver`] - service, autodetect and default tiers
//! - [`cacerts`] - Java trust store discovery under a resolved home

pub mod cacerts;
pub mod resolver;
pub mod strategy;

pub use cacerts::{default_system_paths, find_cacerts, CaCertsOptions};
pub use resolver::{env_name, exe_name, ResolutionTier, ResolvedRuntime, RuntimeResolver};
pub use strategy::detect_path;
