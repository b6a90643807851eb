//! The `list` command: resolve every configured runtime.
//!
//! Defaults come first, then services in name order. Resolution failures
//! are reported per entry and do not stop the listing.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::ListArgs;
use crate::config::Config;
use crate::detection::RuntimeResolver;
use crate::error::Result;

use super::dispatcher::{load, Command, CommandResult};

/// One resolved (or failed) runtime.
#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    /// `None` for the default tier
    pub service: Option<String>,
    pub runtime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Resolve the default runtimes and each service's runtimes.
pub fn collect_entries(config: &Config, resolver: &RuntimeResolver<'_>) -> Vec<ListEntry> {
    let defaults = config
        .default
        .runtimes
        .keys()
        .map(|runtime| (None, runtime.as_str()));
    let services = config.services.iter().flat_map(|(name, service)| {
        service
            .runtimes
            .keys()
            .map(move |runtime| (Some(name.as_str()), runtime.as_str()))
    });

    defaults
        .chain(services)
        .map(|(service, runtime)| {
            let result = resolver.resolve(service.unwrap_or_default(), runtime);
            ListEntry {
                service: service.map(str::to_string),
                runtime: runtime.to_string(),
                home: result.as_ref().ok().cloned(),
                error: result.err().map(|e| e.to_string()),
            }
        })
        .collect()
}

/// The list command implementation.
pub struct ListCommand {
    config_path: PathBuf,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(config_path: &Path, args: ListArgs) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            args,
        }
    }

    fn print_text(
        &self,
        config: &Config,
        entries: &[ListEntry],
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<()> {
        writeln!(out, "Default runtimes:")?;
        print_entries(entries.iter().filter(|e| e.service.is_none()), out, err)?;

        for name in config.services.keys() {
            writeln!(out, "\nService {}:", name)?;
            let own = entries
                .iter()
                .filter(|e| e.service.as_deref() == Some(name.as_str()));
            print_entries(own, out, err)?;
        }
        Ok(())
    }
}

fn print_entries<'a>(
    entries: impl Iterator<Item = &'a ListEntry>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    for entry in entries {
        match (&entry.home, &entry.error) {
            (Some(home), _) => writeln!(out, "  {}: {}", entry.runtime, home.display())?,
            (None, Some(error)) => writeln!(err, "  {}: error: {}", entry.runtime, error)?,
            (None, None) => {}
        }
    }
    Ok(())
}

impl Command for ListCommand {
    fn execute(&self, out: &mut dyn Write, err: &mut dyn Write) -> Result<CommandResult> {
        let config = load(&self.config_path)?;
        let resolver = RuntimeResolver::new(&config);
        let entries = collect_entries(&config, &resolver);

        if self.args.json {
            let json = serde_json::to_string_pretty(&entries).map_err(anyhow::Error::from)?;
            writeln!(out, "{}", json)?;
        } else {
            self.print_text(&config, &entries, out, err)?;
        }
        Ok(CommandResult::success())
    }
}
