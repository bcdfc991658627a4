//! `syllabus check` command implementation.

use std::path::PathBuf;

use clap::Args;
use syllabus_config::{CliSettings, ReferenceCheck, SidebarWarning, SiteConfig};

use crate::documents::FsDocuments;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover syllabus.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// How missing sidebar pages are treated: off, warn or error (overrides config).
    #[arg(long, env = "SYLLABUS_REFERENCES")]
    references: Option<ReferenceCheck>,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or, in `error` mode,
    /// a sidebar page does not exist.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            references: self.references,
        };
        let config = SiteConfig::load(self.config.as_deref(), Some(&cli_settings))?;

        match &config.config_path {
            Some(path) => output.highlight(&format!("Checking {}", path.display())),
            None => output.highlight("Checking default configuration"),
        }
        output.info(&format!(
            "Source: {}",
            config.docs_resolved.source_dir.display()
        ));

        let warnings = check_site(&config)?;
        output.warnings(&warnings);

        let sidebar = &config.sidebar_resolved;
        output.success(&format!(
            "Configuration is valid: {} sidebar groups, {} pages, {} plugins (references: {})",
            sidebar.groups().len(),
            sidebar.pages().count(),
            config.plugins_resolved.len(),
            config.docs_resolved.references,
        ));
        Ok(())
    }
}

/// Check sidebar pages against the docs source directory.
///
/// Returns the build-time sidebar warnings followed by the unresolved pages
/// found in `warn` mode. A missing source directory fails only in `error`
/// mode; in `warn` mode every page is reported as unresolved.
fn check_site(config: &SiteConfig) -> Result<Vec<SidebarWarning>, CliError> {
    let documents = FsDocuments::new(config.docs_resolved.source_dir.clone());
    let mode = config.docs_resolved.references;

    if !documents.root().is_dir() {
        match mode {
            ReferenceCheck::Error => {
                return Err(CliError::Validation(format!(
                    "Docs source directory not found: {}",
                    documents.root().display()
                )));
            }
            ReferenceCheck::Warn => {
                tracing::warn!(
                    source_dir = %documents.root().display(),
                    "Docs source directory not found"
                );
            }
            ReferenceCheck::Off => {}
        }
    }

    let sidebar = &config.sidebar_resolved;
    tracing::info!(mode = %mode, pages = sidebar.pages().count(), "Checking sidebar references");
    let missing = sidebar.check_references(&documents, mode)?;

    let mut warnings = sidebar.warnings().to_vec();
    warnings.extend(missing);
    Ok(warnings)
}
