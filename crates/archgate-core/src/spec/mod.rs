//! Architecture spec: decoding, validation and assembly.
//!
//! # Pipeline
//!
//! ```text
//! archgate.toml
//!   ↓ Decoder            (syntax errors are hard errors)
//! Document + schema notices ──(notices)──→ Spec with notices only
//!   ↓ Validator          (structural notices, all rules run)
//!   ↓ Assembler          (globs resolved against the project root)
//! Spec { components, exclusions, integrity }
//! ```

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::info;

pub mod assembler;
pub mod config_dto;
pub mod decoder;
pub mod document;
pub mod schema;
pub mod source_map;
pub mod validator;

use crate::resolver::Resolver;
use crate::types::{Glob, Notice, Referable, ResolvedPath};
use assembler::{AssembleError, Assembler};
use decoder::{DecodeError, Decoder};
use document::Document;
use validator::{ValidationContext, Validator};

/// Escape hatches of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialFlags {
    /// Any project import is allowed.
    pub allow_all_project_deps: Referable<bool>,
    /// Any vendor import is allowed.
    pub allow_all_vendor_deps: Referable<bool>,
}

/// A fully resolved component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Component name.
    pub name: Referable<String>,
    /// Whether injections gated by this component are deep scanned.
    pub deep_scan: Referable<bool>,
    /// Directories owned by the component.
    pub resolved_paths: Vec<Referable<ResolvedPath>>,
    /// Declared component dependencies.
    pub may_depend_on: Vec<Referable<String>>,
    /// Declared vendor dependencies.
    pub can_use: Vec<Referable<String>>,
    /// Project packages this component may import, unique by import path.
    pub allowed_project_imports: Vec<Referable<ResolvedPath>>,
    /// Vendor import-path globs this component may import.
    pub allowed_vendor_globs: Vec<Referable<Glob>>,
    /// Escape hatches.
    pub special_flags: SpecialFlags,
}

impl Component {
    /// Returns true if `import_path` is one of the component's own packages.
    #[must_use]
    pub fn owns_import_path(&self, import_path: &str) -> bool {
        self.resolved_paths
            .iter()
            .any(|p| p.value.import_path == import_path)
    }
}

/// Global allow flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allow {
    /// Every component may import any vendor package.
    pub dep_on_any_vendor: Referable<bool>,
    /// The deep scan is enabled by default.
    pub deep_scan: Referable<bool>,
}

/// Structural health of the document the spec was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Integrity {
    /// Schema and validation notices.
    pub document_notices: Vec<Notice>,
}

/// The resolved architecture spec. Immutable once assembled.
#[derive(Debug, Clone)]
pub struct Spec {
    /// Module name (import path prefix of project packages).
    pub module_name: String,
    /// Project root directory.
    pub root_directory: PathBuf,
    /// Working directory, relative to the root.
    pub working_directory: Referable<String>,
    /// Components, in declaration order.
    pub components: Vec<Component>,
    /// Excluded directories.
    pub exclude: Vec<Referable<ResolvedPath>>,
    /// Excluded file patterns (valid ones only).
    pub exclude_files_matcher: Vec<Referable<Regex>>,
    /// Global allow flags.
    pub allow: Allow,
    /// Document notices.
    pub integrity: Integrity,
}

impl Spec {
    /// Builds a spec carrying only document notices, used when the document
    /// could not be decoded or assembled.
    #[must_use]
    pub fn with_notices(resolver: &Resolver, document: &Document, notices: Vec<Notice>) -> Self {
        Self {
            module_name: resolver.module_name().to_string(),
            root_directory: resolver.root_directory().to_path_buf(),
            working_directory: document.working_directory().clone(),
            components: Vec::new(),
            exclude: Vec::new(),
            exclude_files_matcher: Vec::new(),
            allow: Allow {
                dep_on_any_vendor: document.allow().dep_on_any_vendor().clone(),
                deep_scan: document.allow().deep_scan().clone(),
            },
            integrity: Integrity {
                document_notices: notices,
            },
        }
    }

    /// Gets a component by name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name.value == name)
    }

    /// Gets the component owning the package at `import_path`.
    #[must_use]
    pub fn component_for_import_path(&self, import_path: &str) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| c.owns_import_path(import_path))
    }

    /// Returns true if the file at `abs_path` is excluded from checking.
    ///
    /// A file is excluded when it lies under an excluded directory or its
    /// absolute path matches an `exclude-files` regex.
    #[must_use]
    pub fn is_excluded(&self, abs_path: &Path) -> bool {
        if self
            .exclude
            .iter()
            .any(|dir| abs_path.starts_with(&dir.value.abs_path))
        {
            return true;
        }
        let text = abs_path.to_string_lossy();
        self.exclude_files_matcher
            .iter()
            .any(|matcher| matcher.value.is_match(&text))
    }

    /// Returns true if the document carried any notice.
    #[must_use]
    pub fn has_notices(&self) -> bool {
        !self.integrity.document_notices.is_empty()
    }
}

/// Where the project and its spec document live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    /// Project root directory.
    pub root_directory: PathBuf,
    /// Module name (import path prefix).
    pub module_name: String,
    /// Spec document path.
    pub spec_path: PathBuf,
}

impl ProjectInfo {
    /// Creates project info.
    #[must_use]
    pub fn new(
        root_directory: impl Into<PathBuf>,
        module_name: impl Into<String>,
        spec_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            root_directory: root_directory.into(),
            module_name: module_name.into(),
            spec_path: spec_path.into(),
        }
    }
}

/// Errors that abort spec loading.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// The document could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The document could not be assembled.
    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

/// Loads the spec of `project` using the glob-backed resolver.
///
/// # Errors
///
/// Returns an error if the document is unreadable, is not valid TOML or
/// its globs cannot be expanded. Structural problems are returned as
/// notices in [`Spec::integrity`].
pub fn load(project: &ProjectInfo) -> Result<Spec, SpecError> {
    let resolver = Resolver::with_glob(&project.root_directory, &project.module_name);
    load_with(&resolver, &project.spec_path)
}

/// Loads the spec at `spec_path` with a custom resolver.
///
/// # Errors
///
/// See [`load`].
pub fn load_with(resolver: &Resolver, spec_path: &Path) -> Result<Spec, SpecError> {
    info!("Loading spec from {}", spec_path.display());
    let decoded = Decoder::new().decode(spec_path)?;
    if !decoded.notices.is_empty() {
        info!(
            "Spec document has {} schema notice(s), skipping assembly",
            decoded.notices.len()
        );
        return Ok(Spec::with_notices(
            resolver,
            &decoded.document,
            decoded.notices,
        ));
    }

    let notices = Validator::new(ValidationContext::new(resolver)).validate(&decoded.document);
    let mut spec = match Assembler::new(resolver).assemble(&decoded.document) {
        Ok(spec) => spec,
        Err(err) if !notices.is_empty() => {
            info!("Spec assembly failed on a document with notices: {}", err);
            return Ok(Spec::with_notices(resolver, &decoded.document, notices));
        }
        Err(err) => return Err(err.into()),
    };
    spec.integrity.document_notices = notices;

    info!(
        "Spec loaded: {} component(s), {} notice(s)",
        spec.components.len(),
        spec.integrity.document_notices.len()
    );
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(doc: &str) -> (TempDir, ProjectInfo) {
        let tmp = TempDir::new().unwrap();
        for dir in ["internal/a", "internal/b", "internal/generated"] {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
        }
        let spec_path = tmp.path().join("archgate.toml");
        fs::write(&spec_path, doc).unwrap();
        let info = ProjectInfo::new(tmp.path(), "example.com/prj", spec_path);
        (tmp, info)
    }

    const DOC: &str = r#"version = 3
workdir = "internal"
exclude = ["generated"]
exclude-files = ["_test\\.go$"]

[[components]]
name = "a"
in = ["a"]
may-depend-on = ["b"]

[[components]]
name = "b"
in = ["b"]
"#;

    #[test]
    fn load_assembles_valid_document() {
        let (_tmp, info) = project(DOC);
        let spec = load(&info).unwrap();

        assert!(!spec.has_notices());
        assert_eq!(spec.module_name, "example.com/prj");
        assert_eq!(spec.components.len(), 2);
        assert_eq!(
            spec.component_for_import_path("example.com/prj/internal/b")
                .map(|c| c.name.value.as_str()),
            Some("b")
        );
        assert!(spec.component_for_import_path("example.com/prj/internal").is_none());
    }

    #[test]
    fn load_keeps_validator_notices() {
        let (_tmp, info) = project("version = 3\ncommon-components = [\"ghost\"]\n");
        let spec = load(&info).unwrap();
        assert_eq!(spec.integrity.document_notices.len(), 1);
        assert_eq!(spec.integrity.document_notices[0].reference.line, 2);
    }

    #[test]
    fn load_stops_at_schema_notices() {
        let (_tmp, info) = project("version = 3\n[[components]]\nname = \"a\"\n");
        let spec = load(&info).unwrap();
        assert_eq!(spec.integrity.document_notices.len(), 1);
        assert!(spec.components.is_empty());
    }

    #[test]
    fn load_keeps_notices_when_assembly_fails() {
        let (_tmp, info) = project(
            "version = 3\ncommon-vendors = [\"ghost\"]\n\n[[components]]\nname = \"a\"\nin = [\"a**\"]\n",
        );
        let spec = load(&info).unwrap();

        let lines: Vec<usize> = spec
            .integrity
            .document_notices
            .iter()
            .map(|n| n.reference.line)
            .collect();
        assert_eq!(lines, vec![2, 6]);
        assert!(spec.components.is_empty());
    }

    #[test]
    fn load_fails_on_syntax_error() {
        let (_tmp, info) = project("version = \n");
        assert!(matches!(load(&info), Err(SpecError::Decode(_))));
    }

    #[test]
    fn exclusions_match_directories_and_regexes() {
        let (tmp, info) = project(DOC);
        let spec = load(&info).unwrap();

        assert!(spec.is_excluded(&tmp.path().join("internal/generated/x.go")));
        assert!(spec.is_excluded(&tmp.path().join("internal/a/a_test.go")));
        assert!(!spec.is_excluded(&tmp.path().join("internal/a/a.go")));
    }
}
