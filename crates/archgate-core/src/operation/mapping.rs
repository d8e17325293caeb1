//! File mapping: which component claims which project file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use super::{sorted_notices, OperationError, ProjectFilesProvider};
use crate::spec::{self, ProjectInfo};
use crate::types::Notice;

/// One project file and its owning component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMapping {
    /// File path relative to the project root.
    pub file_relative_path: PathBuf,
    /// Absolute file path.
    pub file_absolute_path: PathBuf,
    /// Owning component, `None` when no component claims the file.
    pub component_name: Option<String>,
}

/// The files claimed by one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentFiles {
    /// Component name.
    pub component_name: String,
    /// Claimed files, relative to the project root, sorted.
    pub files: Vec<PathBuf>,
}

/// The component ↔ file assignment of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingOutput {
    /// Module name of the project.
    pub module_name: String,
    /// Spec document notices; when present no files were mapped.
    pub document_notices: Vec<Notice>,
    /// Every file with its component, sorted by relative path.
    pub list: Vec<FileMapping>,
    /// Spec components in declaration order, each with its files.
    pub grouped: Vec<ComponentFiles>,
    /// Files no component claims, sorted.
    pub unmatched: Vec<PathBuf>,
}

impl MappingOutput {
    /// Returns true if the spec document carried notices.
    #[must_use]
    pub fn has_notices(&self) -> bool {
        !self.document_notices.is_empty()
    }
}

/// Maps project files onto spec components.
pub struct MappingOperation {
    provider: Box<dyn ProjectFilesProvider>,
}

impl MappingOperation {
    /// Creates the operation over the files supplied by `provider`.
    #[must_use]
    pub fn new(provider: Box<dyn ProjectFilesProvider>) -> Self {
        Self { provider }
    }

    /// Loads the spec and groups the provided files by component.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec cannot be loaded or the files cannot
    /// be collected.
    pub fn run(&self, project: &ProjectInfo) -> Result<MappingOutput, OperationError> {
        let spec = spec::load(project)?;
        let document_notices = sorted_notices(&spec);

        let mut output = MappingOutput {
            module_name: spec.module_name.clone(),
            document_notices,
            list: Vec::new(),
            grouped: Vec::new(),
            unmatched: Vec::new(),
        };
        if output.has_notices() {
            info!(
                "Spec document has {} notice(s), skipping mapping",
                output.document_notices.len()
            );
            return Ok(output);
        }

        let files = self
            .provider
            .project_files(&spec)
            .map_err(OperationError::ProjectFiles)?;

        let mut by_component: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for hold in files {
            let relative = hold.file.relative_path(&spec.root_directory);
            match &hold.component_id {
                Some(name) => by_component
                    .entry(name.clone())
                    .or_default()
                    .push(relative.clone()),
                None => output.unmatched.push(relative.clone()),
            }
            output.list.push(FileMapping {
                file_relative_path: relative,
                file_absolute_path: hold.file.path,
                component_name: hold.component_id,
            });
        }

        output
            .list
            .sort_by(|a, b| a.file_relative_path.cmp(&b.file_relative_path));
        output.unmatched.sort();
        output.grouped = spec
            .components
            .iter()
            .map(|component| {
                let mut files = by_component
                    .remove(&component.name.value)
                    .unwrap_or_default();
                files.sort();
                ComponentFiles {
                    component_name: component.name.value.clone(),
                    files,
                }
            })
            .collect();

        info!(
            "Mapped {} file(s) onto {} component(s), {} unmatched",
            output.list.len(),
            output.grouped.len(),
            output.unmatched.len()
        );
        Ok(output)
    }
}

impl fmt::Debug for MappingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingOperation").finish_non_exhaustive()
    }
}
