//! Syllabus CLI - course site configuration checker.
//!
//! Provides commands for:
//! - `check`: Validate `syllabus.toml` and the pages its sidebar references
//! - `export`: Write the validated site manifest as JSON for the site framework

mod commands;
mod documents;
mod error;
mod manifest;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, ExportArgs};
use output::Output;

/// Syllabus - course site configuration checker.
#[derive(Parser)]
#[command(name = "syllabus", version, about)]
struct Cli {
    /// Enable verbose output (show configuration loading logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and the sidebar pages.
    Check(CheckArgs),
    /// Export the validated site manifest as JSON.
    Export(ExportArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check(args) => args.execute(),
        Commands::Export(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
