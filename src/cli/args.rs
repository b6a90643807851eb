//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use crate::config::DEFAULT_CONFIG_PATH;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// runtime-utils - Locate language runtimes and start services on them.
#[derive(Debug, Parser)]
#[command(name = "runtime-utils")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the runtime configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "RUNTIME_UTILS_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the detected runtime home as a shell export
    Detect(DetectArgs),

    /// List detected runtimes for defaults and every service
    List(ListArgs),

    /// Print the Java trust store path
    Cacerts(CacertsArgs),

    /// Start a service on its detected runtime
    Start(StartArgs),
}

/// Arguments for the `detect` command.
#[derive(Debug, Clone, clap::Args)]
pub struct DetectArgs {
    /// Runtime to detect (java, python, ...)
    #[arg(short, long)]
    pub runtime: String,

    /// Service name (e.g. TRINO)
    #[arg(short, long, default_value = "")]
    pub service: String,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `cacerts` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CacertsArgs {
    /// Service whose Java runtime is used
    #[arg(short, long, default_value = "")]
    pub service: String,
}

/// Arguments for the `start` command.
#[derive(Debug, Clone, clap::Args)]
pub struct StartArgs {
    /// Service to start
    #[arg(short, long)]
    pub service: String,

    /// Runtime the service runs on
    #[arg(short, long)]
    pub runtime: String,

    /// Run health checks and notify systemd once they pass
    #[arg(long)]
    pub supervise: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_defaults_to_system_path() {
        let cli = Cli::try_parse_from(["runtime-utils", "list"]).unwrap();
        if std::env::var_os("RUNTIME_UTILS_CONFIG").is_none() {
            assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        }
        assert!(!cli.debug);
    }

    #[test]
    fn parses_detect() {
        let cli = Cli::try_parse_from([
            "runtime-utils",
            "--config",
            "/tmp/c.yaml",
            "detect",
            "--runtime",
            "java",
            "--service",
            "TRINO",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/tmp/c.yaml"));
        match cli.command {
            Commands::Detect(args) => {
                assert_eq!(args.runtime, "java");
                assert_eq!(args.service, "TRINO");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn detect_service_is_optional() {
        let cli = Cli::try_parse_from(["runtime-utils", "detect", "-r", "python"]).unwrap();
        match cli.command {
            Commands::Detect(args) => assert!(args.service.is_empty()),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn detect_requires_runtime() {
        assert!(Cli::try_parse_from(["runtime-utils", "detect"]).is_err());
    }

    #[test]
    fn parses_start_with_supervise() {
        let cli = Cli::try_parse_from([
            "runtime-utils",
            "start",
            "--service",
            "KAFKA",
            "--runtime",
            "java",
            "--supervise",
            "--debug",
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Commands::Start(args) => {
                assert_eq!(args.service, "KAFKA");
                assert!(args.supervise);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn start_requires_service() {
        assert!(Cli::try_parse_from(["runtime-utils", "start", "--runtime", "java"]).is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["runtime-utils"]).is_err());
    }
}
