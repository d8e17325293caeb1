//! Operations over a project: check, file mapping and spec inspection.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::checker::{CheckContext, CheckError, Checker, CompositeChecker};
use crate::result::{limit, CheckResult};
use crate::spec::assembler::AssembleError;
use crate::spec::decoder::DecodeError;
use crate::spec::{self, ProjectInfo, Spec, SpecError};
use crate::types::{FileHold, Notice};

mod inspect;
mod mapping;

pub use inspect::{ComponentSummary, SelfInspectOperation, SelfInspection};
pub use mapping::{ComponentFiles, FileMapping, MappingOperation, MappingOutput};

/// Boxed error returned by external collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Supplies the classified project files (the external scanner seam).
pub trait ProjectFilesProvider: Send + Sync {
    /// Returns every file to check, attributed to its component.
    ///
    /// # Errors
    ///
    /// Returns an error if the files cannot be collected.
    fn project_files(&self, spec: &Spec) -> Result<Vec<FileHold>, BoxError>;
}

impl<F> ProjectFilesProvider for F
where
    F: Fn(&Spec) -> Result<Vec<FileHold>, BoxError> + Send + Sync,
{
    fn project_files(&self, spec: &Spec) -> Result<Vec<FileHold>, BoxError> {
        self(spec)
    }
}

/// Errors that abort the operation, by stage.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The spec document could not be decoded.
    #[error("failed to decode spec document: {0}")]
    Decode(#[source] DecodeError),

    /// The spec could not be assembled.
    #[error("failed to assemble spec: {0}")]
    Assemble(#[source] AssembleError),

    /// The project files could not be collected.
    #[error("failed to collect project files: {0}")]
    ProjectFiles(#[source] BoxError),

    /// A checker failed.
    #[error("failed to check project: {0}")]
    Check(#[from] CheckError),
}

impl From<SpecError> for OperationError {
    fn from(err: SpecError) -> Self {
        match err {
            SpecError::Decode(e) => Self::Decode(e),
            SpecError::Assemble(e) => Self::Assemble(e),
        }
    }
}

/// Upper bound on reported warnings, in `1..=32768`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MaxWarnings(usize);

/// A [`MaxWarnings`] value out of range or not a number.
#[derive(Debug, Error)]
#[error("max warnings must be a number between {min} and {max}, got '{value}'", min = MaxWarnings::MIN, max = MaxWarnings::MAX)]
pub struct MaxWarningsError {
    value: String,
}

impl MaxWarnings {
    /// Smallest accepted value.
    pub const MIN: usize = 1;
    /// Largest accepted value.
    pub const MAX: usize = 32_768;
    /// Value used when none is configured.
    pub const DEFAULT: Self = Self(100);

    /// Validates `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is outside `1..=32768`.
    pub fn new(value: usize) -> Result<Self, MaxWarningsError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(MaxWarningsError {
                value: value.to_string(),
            })
        }
    }

    /// Returns the bound.
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for MaxWarnings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for MaxWarnings {
    type Err = MaxWarningsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<usize>().map_err(|_| MaxWarningsError {
            value: s.to_string(),
        })?;
        Self::new(value)
    }
}

impl fmt::Display for MaxWarnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInput {
    /// The project and its spec document.
    pub project: ProjectInfo,
    /// Upper bound on reported warnings.
    pub max_warnings: MaxWarnings,
}

/// One kind of check and whether the spec put it to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckQuality {
    /// Quality id (e.g., "vendor_imports").
    pub id: &'static str,
    /// Whether the check was active for this spec.
    pub used: bool,
}

impl CheckQuality {
    fn from_spec(spec: &Spec) -> Vec<Self> {
        vec![
            Self {
                id: "component_imports",
                used: !spec.components.is_empty(),
            },
            Self {
                id: "vendor_imports",
                used: !spec.allow.dep_on_any_vendor.value,
            },
            Self {
                id: "deepscan",
                used: spec.allow.deep_scan.value,
            },
        ]
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// No warnings, no document notices.
    Passed,
    /// Something was reported.
    Failed,
}

/// Everything a run reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutput {
    /// Module name of the checked project.
    pub module_name: String,
    /// Spec document notices, sorted by file then line.
    pub document_notices: Vec<Notice>,
    /// Kept warnings.
    pub warnings: CheckResult,
    /// Warnings dropped by the limit.
    pub omitted_count: usize,
    /// Check qualities of the spec.
    pub qualities: Vec<CheckQuality>,
}

impl CheckOutput {
    /// `Failed` if any warning or document notice was reported.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        if self.document_notices.is_empty() && !self.warnings.has_notices() {
            Verdict::Passed
        } else {
            Verdict::Failed
        }
    }

    /// Number of warnings found before limiting.
    #[must_use]
    pub fn total_warnings(&self) -> usize {
        self.warnings.total() + self.omitted_count
    }
}

/// Runs the full check pipeline.
pub struct CheckOperation {
    provider: Box<dyn ProjectFilesProvider>,
    checker: CompositeChecker,
}

impl CheckOperation {
    /// Creates an operation using the standard checkers.
    #[must_use]
    pub fn new(provider: Box<dyn ProjectFilesProvider>) -> Self {
        Self::with_checker(provider, CompositeChecker::standard())
    }

    /// Creates an operation with a custom composite.
    #[must_use]
    pub fn with_checker(provider: Box<dyn ProjectFilesProvider>, checker: CompositeChecker) -> Self {
        Self { provider, checker }
    }

    /// Loads the spec and, when the document is clean, checks the project.
    ///
    /// # Errors
    ///
    /// Returns an error naming the stage that failed. Document notices and
    /// warnings are not errors; see [`CheckOutput::verdict`].
    pub fn run(&self, ctx: &CheckContext, input: &CheckInput) -> Result<CheckOutput, OperationError> {
        let spec = spec::load(&input.project)?;

        let document_notices = sorted_notices(&spec);

        let mut warnings = CheckResult::new();
        let mut omitted_count = 0;
        if document_notices.is_empty() {
            let files = self
                .provider
                .project_files(&spec)
                .map_err(OperationError::ProjectFiles)?;
            info!("Checking {} file(s)", files.len());

            let result = self.checker.check(ctx, &spec, &files)?;
            let limited = limit(result, input.max_warnings.get());
            warnings = limited.result;
            omitted_count = limited.omitted;
        } else {
            info!(
                "Spec document has {} notice(s), skipping dependency check",
                document_notices.len()
            );
        }

        info!(
            "Check finished: {} warning(s), {} omitted",
            warnings.total(),
            omitted_count
        );
        Ok(CheckOutput {
            module_name: spec.module_name.clone(),
            qualities: CheckQuality::from_spec(&spec),
            document_notices,
            warnings,
            omitted_count,
        })
    }
}

/// Document notices of `spec`, sorted by file then line.
fn sorted_notices(spec: &Spec) -> Vec<Notice> {
    let mut notices = spec.integrity.document_notices.clone();
    notices.sort_by(|a, b| {
        (&a.reference.file, a.reference.line).cmp(&(&b.reference.file, b.reference.line))
    });
    notices
}

impl fmt::Debug for CheckOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckOperation")
            .field("checker", &self.checker)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImportType, ProjectFile, Reference, ResolvedImport};
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    const DOC: &str = r#"version = 3

[[components]]
name = "a"
in = ["a"]

[[components]]
name = "b"
in = ["b"]
"#;

    fn project(doc: &str) -> (TempDir, CheckInput) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a")).unwrap();
        fs::create_dir_all(tmp.path().join("b")).unwrap();
        let spec_path = tmp.path().join("archgate.toml");
        fs::write(&spec_path, doc).unwrap();
        let input = CheckInput {
            project: ProjectInfo::new(tmp.path(), "example.com/prj", spec_path),
            max_warnings: MaxWarnings::default(),
        };
        (tmp, input)
    }

    fn a_imports_b(root: &Path, count: usize) -> Vec<FileHold> {
        let path = root.join("a/a.go");
        let imports = (0..count)
            .map(|i| {
                ResolvedImport::new(
                    "example.com/prj/b",
                    ImportType::Project,
                    Reference::new(path.clone(), i + 3, 2),
                )
            })
            .collect();
        vec![FileHold::owned(ProjectFile::new(path, imports), "a")]
    }

    fn operation(root: &Path, count: usize) -> CheckOperation {
        let files = a_imports_b(root, count);
        CheckOperation::new(Box::new(move |_: &Spec| -> Result<Vec<FileHold>, BoxError> {
            Ok(files.clone())
        }))
    }

    #[test]
    fn failed_verdict_on_warnings() {
        let (tmp, input) = project(DOC);
        let output = operation(tmp.path(), 1)
            .run(&CheckContext::new(), &input)
            .unwrap();

        assert_eq!(output.module_name, "example.com/prj");
        assert_eq!(output.warnings.dependency_warnings.len(), 1);
        assert_eq!(output.verdict(), Verdict::Failed);
    }

    #[test]
    fn passed_verdict_when_clean() {
        let (tmp, input) = project(DOC);
        let output = operation(tmp.path(), 0)
            .run(&CheckContext::new(), &input)
            .unwrap();
        assert_eq!(output.verdict(), Verdict::Passed);
        assert_eq!(output.total_warnings(), 0);
    }

    #[test]
    fn limits_warnings() {
        let (tmp, mut input) = project(DOC);
        input.max_warnings = MaxWarnings::new(2).unwrap();
        let output = operation(tmp.path(), 5)
            .run(&CheckContext::new(), &input)
            .unwrap();
        assert_eq!(output.warnings.total(), 2);
        assert_eq!(output.omitted_count, 3);
        assert_eq!(output.total_warnings(), 5);
    }

    #[test]
    fn document_notices_skip_checking() {
        let (_tmp, input) = project("version = 3\ncommon-vendors = [\"log\"]\n");
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let op = CheckOperation::new(Box::new(move |_: &Spec| -> Result<Vec<FileHold>, BoxError> {
            flag.store(true, Ordering::SeqCst);
            Ok(Vec::new())
        }));

        let output = op.run(&CheckContext::new(), &input).unwrap();
        assert_eq!(output.document_notices.len(), 1);
        assert_eq!(output.verdict(), Verdict::Failed);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn qualities_follow_spec() {
        let (tmp, input) = project(
            "version = 2\n[allow]\ndep-on-any-vendor = true\n[[components]]\nname = \"a\"\nin = [\"a\"]\n",
        );
        let output = operation(tmp.path(), 0)
            .run(&CheckContext::new(), &input)
            .unwrap();
        let used: Vec<(&str, bool)> = output.qualities.iter().map(|q| (q.id, q.used)).collect();
        assert_eq!(
            used,
            vec![
                ("component_imports", true),
                ("vendor_imports", false),
                ("deepscan", false),
            ]
        );
    }

    #[test]
    fn provider_failure_names_stage() {
        let (_tmp, input) = project(DOC);
        let op = CheckOperation::new(Box::new(|_: &Spec| -> Result<Vec<FileHold>, BoxError> {
            Err("scanner unavailable".into())
        }));
        let err = op.run(&CheckContext::new(), &input).unwrap_err();
        assert!(matches!(err, OperationError::ProjectFiles(_)));
        assert!(err.to_string().contains("scanner unavailable"));
    }

    #[test]
    fn missing_document_is_decode_error() {
        let (tmp, mut input) = project(DOC);
        input.project.spec_path = tmp.path().join("missing.toml");
        let err = operation(tmp.path(), 0)
            .run(&CheckContext::new(), &input)
            .unwrap_err();
        assert!(matches!(err, OperationError::Decode(DecodeError::Io { .. })));
    }

    #[test]
    fn cancellation_is_check_error() {
        let (tmp, input) = project(DOC);
        let ctx = CheckContext::new();
        ctx.cancel();
        let err = operation(tmp.path(), 1).run(&ctx, &input).unwrap_err();
        assert!(matches!(err, OperationError::Check(CheckError::Cancelled)));
    }

    #[test]
    fn max_warnings_bounds() {
        assert!(MaxWarnings::new(0).is_err());
        assert!(MaxWarnings::new(32_769).is_err());
        assert_eq!(MaxWarnings::new(32_768).unwrap().get(), 32_768);
        assert_eq!("15".parse::<MaxWarnings>().unwrap().get(), 15);
        assert!("many".parse::<MaxWarnings>().is_err());
        assert_eq!(MaxWarnings::default().get(), 100);
    }
}
