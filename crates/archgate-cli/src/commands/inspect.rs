//! Self-inspect command implementation.

use anyhow::{Context, Result};
use archgate_core::{ProjectInfo, SelfInspectOperation};
use std::path::Path;

use super::Project;
use crate::config_resolver::SpecSource;
use crate::OutputFormat;

/// Runs the self-inspect command.
pub fn run(path: &Path, source: &SpecSource, module: &str, format: OutputFormat) -> Result<()> {
    let project = Project::open(path, source)?;
    let info = ProjectInfo::new(&project.root, module, &project.spec_path);

    let inspection = SelfInspectOperation::new()
        .run(&info)
        .context("Self-inspection failed")?;

    super::output::print_inspection(&inspection, format)?;

    if inspection.has_notices() {
        std::process::exit(1);
    }

    Ok(())
}
