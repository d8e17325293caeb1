//! archgate CLI tool.
//!
//! Usage:
//! ```bash
//! archgate check [OPTIONS] --files <REPORT> [PATH]
//! archgate mapping [OPTIONS] --files <REPORT> [PATH]
//! archgate self-inspect [OPTIONS] --module <MODULE> [PATH]
//! archgate list-checks
//! archgate init
//! ```

use anyhow::Result;
use archgate_core::MaxWarnings;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;
mod scan_report;

/// Checks a project's imports against its declared architecture
#[derive(Parser)]
#[command(name = "archgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the project against its spec
    Check {
        /// Project root directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Path to the spec document
        #[arg(short, long)]
        spec: Option<PathBuf>,

        /// Scan report with the classified project files ("-" for stdin)
        #[arg(long)]
        files: PathBuf,

        /// Maximum number of warnings to report (1..=32768)
        #[arg(long, env = "ARCHGATE_MAX_WARNINGS", default_value_t = MaxWarnings::default())]
        max_warnings: MaxWarnings,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show which component claims which file
    Mapping {
        /// Project root directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Path to the spec document
        #[arg(short, long)]
        spec: Option<PathBuf>,

        /// Scan report with the classified project files ("-" for stdin)
        #[arg(long)]
        files: PathBuf,

        /// List files, or group them by component
        #[arg(long, default_value = "list")]
        scheme: MappingScheme,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the spec as resolved against the project
    SelfInspect {
        /// Project root directory (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Path to the spec document
        #[arg(short, long)]
        spec: Option<PathBuf>,

        /// Module name (import path prefix of project packages)
        #[arg(short, long)]
        module: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the checks and spec validation rules
    ListChecks,

    /// Create an archgate.toml template
    Init {
        /// Overwrite existing spec
        #[arg(long)]
        force: bool,
    },
}

/// Output format for check results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-warning compact format.
    Compact,
}

/// Layout of the mapping output.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum MappingScheme {
    /// One line per file.
    #[default]
    List,
    /// Files under their component.
    Grouped,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            spec,
            files,
            max_warnings,
            format,
        } => {
            let source = config_resolver::resolve(&path, spec.as_deref())?;
            commands::check::run(&path, &source, &files, max_warnings, format)
        }
        Commands::Mapping {
            path,
            spec,
            files,
            scheme,
            format,
        } => {
            let source = config_resolver::resolve(&path, spec.as_deref())?;
            commands::mapping::run(&path, &source, &files, scheme, format)
        }
        Commands::SelfInspect {
            path,
            spec,
            module,
            format,
        } => {
            let source = config_resolver::resolve(&path, spec.as_deref())?;
            commands::inspect::run(&path, &source, &module, format)
        }
        Commands::ListChecks => {
            commands::list_checks::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
