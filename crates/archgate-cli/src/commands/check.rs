//! Check command implementation.

use anyhow::{Context, Result};
use archgate_core::{CheckContext, CheckInput, CheckOperation, MaxWarnings, ProjectInfo, Verdict};
use std::path::Path;

use super::Project;
use crate::config_resolver::SpecSource;
use crate::scan_report::ScanReport;
use crate::OutputFormat;

/// Runs the check command.
pub fn run(
    path: &Path,
    source: &SpecSource,
    files: &Path,
    max_warnings: MaxWarnings,
    format: OutputFormat,
) -> Result<()> {
    let project = Project::open(path, source)?;
    let report = ScanReport::read(files)?;
    let info = ProjectInfo::new(&project.root, &report.module, &project.spec_path);
    let holds = report.into_holds(&project.root);
    tracing::info!(
        "Checking {} with {} scanned file(s)",
        project.root.display(),
        holds.len()
    );

    let operation = CheckOperation::new(super::scanned_files(holds));
    let input = CheckInput {
        project: info,
        max_warnings,
    };
    let output = operation
        .run(&CheckContext::new(), &input)
        .context("Check failed")?;

    super::output::print(&output, format)?;

    if output.verdict() == Verdict::Failed {
        std::process::exit(1);
    }

    Ok(())
}
