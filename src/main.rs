//! runtime-utils CLI entry point.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use runtime_utils::cli::{Cli, CommandDispatcher};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr; stdout is reserved for command output.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("runtime_utils=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("runtime_utils=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("runtime-utils starting with args: {:?}", cli);

    let dispatcher = CommandDispatcher::new(cli.config.clone());
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();

    let code = match dispatcher.dispatch(&cli, &mut stdout, &mut stderr) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            let _ = writeln!(stderr, "Error: {}", e);
            ExitCode::from(1)
        }
    };
    let _ = stdout.flush();
    code
}
