//! `syllabus export` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use syllabus_config::SiteConfig;

use crate::error::CliError;
use crate::manifest::SiteManifest;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Path to configuration file (default: auto-discover syllabus.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the manifest to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed JSON.
    #[arg(long)]
    compact: bool,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// Nothing is written unless the whole configuration is valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the manifest
    /// cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = SiteConfig::load(self.config.as_deref(), None)?;
        let manifest = SiteManifest::new(&config);

        let mut json = if self.compact {
            serde_json::to_string(&manifest)?
        } else {
            serde_json::to_string_pretty(&manifest)?
        };
        json.push('\n');

        match self.output {
            Some(path) => {
                std::fs::write(&path, json)?;
                Output::new().success(&format!("Manifest written to {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(json.as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }
}
