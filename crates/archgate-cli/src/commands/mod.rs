//! Subcommand implementations.

pub mod check;
pub mod init;
pub mod inspect;
pub mod list_checks;
pub mod mapping;
pub mod output;

use anyhow::{bail, Context, Result};
use archgate_core::{BoxError, FileHold, ProjectFilesProvider, Spec};
use std::path::{Path, PathBuf};

use crate::config_resolver::SpecSource;

/// Canonical project root and the spec document to load.
pub struct Project {
    /// Canonical root directory.
    pub root: PathBuf,
    /// Spec document path.
    pub spec_path: PathBuf,
}

impl Project {
    /// Opens the project at `path` with the spec found by `source`.
    pub fn open(path: &Path, source: &SpecSource) -> Result<Self> {
        let root = path
            .canonicalize()
            .with_context(|| format!("Failed to open project directory: {}", path.display()))?;
        let Some(spec_path) = source.path() else {
            bail!(
                "No spec document found in {}. Run `archgate init` or pass --spec.",
                root.display()
            );
        };
        Ok(Self {
            root,
            spec_path: spec_path.to_path_buf(),
        })
    }
}

/// Serves the scanned files, minus the ones the spec excludes.
pub fn scanned_files(holds: Vec<FileHold>) -> Box<dyn ProjectFilesProvider> {
    Box::new(move |spec: &Spec| -> Result<Vec<FileHold>, BoxError> {
        Ok(included(spec, &holds))
    })
}

fn included(spec: &Spec, holds: &[FileHold]) -> Vec<FileHold> {
    holds
        .iter()
        .filter(|hold| {
            let excluded = spec.is_excluded(&hold.file.path);
            if excluded {
                tracing::debug!("Excluded {}", hold.file.path.display());
            }
            !excluded
        })
        .cloned()
        .collect()
}
