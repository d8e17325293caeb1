//! Mapping command implementation.

use anyhow::{Context, Result};
use archgate_core::{MappingOperation, ProjectInfo};
use std::path::Path;

use super::Project;
use crate::config_resolver::SpecSource;
use crate::scan_report::ScanReport;
use crate::{MappingScheme, OutputFormat};

/// Runs the mapping command.
pub fn run(
    path: &Path,
    source: &SpecSource,
    files: &Path,
    scheme: MappingScheme,
    format: OutputFormat,
) -> Result<()> {
    let project = Project::open(path, source)?;
    let report = ScanReport::read(files)?;
    let info = ProjectInfo::new(&project.root, &report.module, &project.spec_path);
    let holds = report.into_holds(&project.root);

    let output = MappingOperation::new(super::scanned_files(holds))
        .run(&info)
        .context("Mapping failed")?;

    super::output::print_mapping(&output, scheme, format)?;

    if output.has_notices() {
        std::process::exit(1);
    }

    Ok(())
}
