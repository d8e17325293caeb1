//! Dependency checkers.
//!
//! A [`Checker`] reads the classified project files and reports warnings
//! against a resolved [`Spec`]. [`CompositeChecker`] runs the standard
//! two-tier list: direct imports first, the deep scan only if the imports
//! are clean.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::result::CheckResult;
use crate::spec::Spec;
use crate::types::{FileHold, Reference};

pub mod deepscan;
pub mod imports;

pub use deepscan::DeepScanChecker;
pub use imports::ImportsChecker;

/// Errors that abort a check run.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The run was cancelled through its [`CheckContext`].
    #[error("check cancelled")]
    Cancelled,

    /// A file is attributed to a component the spec does not declare.
    #[error("file {file} belongs to unknown component '{component}'")]
    UnknownComponent {
        /// The component id.
        component: String,
        /// The file.
        file: PathBuf,
    },

    /// A vendor glob could not be compiled.
    #[error("{reference}: invalid vendor import glob '{glob}': {source}")]
    InvalidVendorGlob {
        /// The pattern.
        glob: String,
        /// Vendor declaration the glob belongs to.
        reference: Reference,
        /// Underlying pattern error.
        source: glob::PatternError,
    },

    /// A checker failed.
    #[error("checker '{checker}' failed: {source}")]
    Checker {
        /// Name of the failed checker.
        checker: &'static str,
        /// What went wrong.
        source: Box<CheckError>,
    },
}

/// Per-run context shared by every checker.
///
/// Clones share the cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    cancelled: Arc<AtomicBool>,
}

impl CheckContext {
    /// Creates a context that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every run using this context.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails with [`CheckError::Cancelled`] if cancellation was requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the context is cancelled.
    pub fn ensure_active(&self) -> Result<(), CheckError> {
        if self.is_cancelled() {
            Err(CheckError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Checks classified project files against a spec.
pub trait Checker: Send + Sync {
    /// Returns the kebab-case name of this checker (e.g., "imports").
    fn name(&self) -> &'static str;

    /// Checks `files` and returns every warning found.
    ///
    /// # Errors
    ///
    /// Returns an error if the run is cancelled or the spec cannot be
    /// applied to a file.
    fn check(
        &self,
        ctx: &CheckContext,
        spec: &Spec,
        files: &[FileHold],
    ) -> Result<CheckResult, CheckError>;
}

/// Type alias for boxed Checker trait objects.
pub type CheckerBox = Box<dyn Checker>;

/// Runs checkers in order, stopping after the first one that reports
/// anything unless it is the last.
pub struct CompositeChecker {
    checkers: Vec<CheckerBox>,
}

impl CompositeChecker {
    /// Creates a composite over `checkers`.
    #[must_use]
    pub fn new(checkers: Vec<CheckerBox>) -> Self {
        Self { checkers }
    }

    /// Creates the standard composite: imports, then deep scan.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![Box::new(ImportsChecker), Box::new(DeepScanChecker)])
    }

    /// Returns the checker names, in execution order.
    #[must_use]
    pub fn checker_names(&self) -> Vec<&'static str> {
        self.checkers.iter().map(|c| c.name()).collect()
    }
}

impl std::fmt::Debug for CompositeChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeChecker")
            .field("checkers", &self.checker_names())
            .finish()
    }
}

impl Checker for CompositeChecker {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn check(
        &self,
        ctx: &CheckContext,
        spec: &Spec,
        files: &[FileHold],
    ) -> Result<CheckResult, CheckError> {
        let mut result = CheckResult::new();
        let last = self.checkers.len().saturating_sub(1);

        for (index, checker) in self.checkers.iter().enumerate() {
            ctx.ensure_active()?;

            let found = checker
                .check(ctx, spec, files)
                .map_err(|err| match err {
                    CheckError::Cancelled => CheckError::Cancelled,
                    other => CheckError::Checker {
                        checker: checker.name(),
                        source: Box::new(other),
                    },
                })?;
            let has_notices = found.has_notices();
            debug!("Checker '{}': {} warning(s)", checker.name(), found.total());
            result.append(found);

            if has_notices && index != last {
                debug!(
                    "Checker '{}' reported warnings, skipping remaining checkers",
                    checker.name()
                );
                break;
            }
        }

        Ok(result)
    }
}
