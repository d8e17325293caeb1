//! Self inspection: the assembled spec as the checkers will see it.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use super::{sorted_notices, OperationError};
use crate::spec::{self, Component, ProjectInfo};
use crate::types::{Notice, Referable};

/// A resolved component, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSummary {
    /// Component name.
    pub name: String,
    /// Import paths of the owned directories.
    pub packages: Vec<String>,
    /// Declared component dependencies.
    pub may_depend_on: Vec<String>,
    /// Declared vendor dependencies.
    pub can_use: Vec<String>,
    /// Every project import path the component may use.
    pub allowed_project_imports: Vec<String>,
    /// Every vendor glob the component may use.
    pub allowed_vendor_globs: Vec<String>,
    /// `any-project-deps`.
    pub allow_all_project_deps: bool,
    /// `any-vendor-deps`.
    pub allow_all_vendor_deps: bool,
    /// Deep scan of this component's injection gates.
    pub deep_scan: bool,
}

impl From<&Component> for ComponentSummary {
    fn from(component: &Component) -> Self {
        Self {
            name: component.name.value.clone(),
            packages: component
                .resolved_paths
                .iter()
                .map(|p| p.value.import_path.clone())
                .collect(),
            may_depend_on: values(&component.may_depend_on),
            can_use: values(&component.can_use),
            allowed_project_imports: component
                .allowed_project_imports
                .iter()
                .map(|p| p.value.import_path.clone())
                .collect(),
            allowed_vendor_globs: component
                .allowed_vendor_globs
                .iter()
                .map(|g| g.value.as_str().to_string())
                .collect(),
            allow_all_project_deps: component.special_flags.allow_all_project_deps.value,
            allow_all_vendor_deps: component.special_flags.allow_all_vendor_deps.value,
            deep_scan: component.deep_scan.value,
        }
    }
}

fn values(referables: &[Referable<String>]) -> Vec<String> {
    referables.iter().map(|r| r.value.clone()).collect()
}

/// The assembled spec together with its document notices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfInspection {
    /// Module name of the project.
    pub module_name: String,
    /// Project root directory.
    pub root_directory: PathBuf,
    /// The inspected spec document.
    pub spec_path: PathBuf,
    /// Working directory, relative to the root.
    pub working_directory: String,
    /// Excluded directories, relative to the root.
    pub exclude: Vec<String>,
    /// Exclusion regexes that compiled.
    pub exclude_files: Vec<String>,
    /// Global `dep-on-any-vendor`.
    pub dep_on_any_vendor: bool,
    /// Global `deep-scan`.
    pub deep_scan: bool,
    /// Resolved components, in declaration order.
    pub components: Vec<ComponentSummary>,
    /// Spec document notices, sorted by file then line.
    pub document_notices: Vec<Notice>,
}

impl SelfInspection {
    /// Returns true if the spec document carried notices.
    #[must_use]
    pub fn has_notices(&self) -> bool {
        !self.document_notices.is_empty()
    }
}

/// Loads the spec and reports it without checking any file.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfInspectOperation;

impl SelfInspectOperation {
    /// Creates the operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Loads and summarizes the spec of `project`.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec cannot be decoded or assembled.
    pub fn run(&self, project: &ProjectInfo) -> Result<SelfInspection, OperationError> {
        let spec = spec::load(project)?;
        info!(
            "Inspected spec {}: {} component(s)",
            project.spec_path.display(),
            spec.components.len()
        );

        Ok(SelfInspection {
            module_name: spec.module_name.clone(),
            root_directory: spec.root_directory.clone(),
            spec_path: project.spec_path.clone(),
            working_directory: spec.working_directory.value.clone(),
            exclude: spec
                .exclude
                .iter()
                .map(|dir| dir.value.local_path.clone())
                .collect(),
            exclude_files: spec
                .exclude_files_matcher
                .iter()
                .map(|matcher| matcher.value.as_str().to_string())
                .collect(),
            dep_on_any_vendor: spec.allow.dep_on_any_vendor.value,
            deep_scan: spec.allow.deep_scan.value,
            components: spec.components.iter().map(ComponentSummary::from).collect(),
            document_notices: sorted_notices(&spec),
        })
    }
}
