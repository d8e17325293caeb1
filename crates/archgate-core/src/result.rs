//! Check warnings, their aggregation and limiting.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::types::Reference;

/// An import the owning component is not allowed to make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyWarning {
    /// Component owning the file.
    pub component_name: String,
    /// File path relative to the project root.
    pub file_relative_path: PathBuf,
    /// Absolute file path.
    pub file_absolute_path: PathBuf,
    /// The disallowed import.
    pub resolved_import_name: String,
    /// Location of the import.
    pub reference: Reference,
}

/// A file no component claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchWarning {
    /// File path relative to the project root.
    pub file_relative_path: PathBuf,
    /// Absolute file path.
    pub file_absolute_path: PathBuf,
    /// Always empty: the whole file is affected.
    pub reference: Reference,
}

/// An injected dependency the gate's component is not allowed to receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeepScanWarning {
    /// Component owning the gate method.
    pub gate_component: String,
    /// Gate method name.
    pub gate_method: String,
    /// Location of the gate method definition.
    pub gate_definition: Reference,
    /// Package of the injected implementation.
    pub dependency_name: String,
    /// File containing the injection, relative to the project root.
    pub file_relative_path: PathBuf,
    /// Absolute path of that file.
    pub file_absolute_path: PathBuf,
    /// Location of the injection.
    pub reference: Reference,
}

/// Warnings from one or more checkers, by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Disallowed imports.
    pub dependency_warnings: Vec<DependencyWarning>,
    /// Files outside every component.
    pub match_warnings: Vec<MatchWarning>,
    /// Disallowed injections.
    pub deepscan_warnings: Vec<DeepScanWarning>,
}

impl CheckResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves all warnings of `other` behind this result's warnings.
    pub fn append(&mut self, other: Self) {
        self.dependency_warnings.extend(other.dependency_warnings);
        self.match_warnings.extend(other.match_warnings);
        self.deepscan_warnings.extend(other.deepscan_warnings);
    }

    /// Returns true if there is any warning.
    #[must_use]
    pub fn has_notices(&self) -> bool {
        self.total() > 0
    }

    /// Number of warnings over all categories.
    #[must_use]
    pub fn total(&self) -> usize {
        self.dependency_warnings.len() + self.match_warnings.len() + self.deepscan_warnings.len()
    }

    /// Stable sort of every category by relative file path, then line.
    pub fn sort(&mut self) {
        sort_located(&mut self.dependency_warnings, |w| {
            (w.file_relative_path.as_path(), w.reference.line)
        });
        sort_located(&mut self.match_warnings, |w| {
            (w.file_relative_path.as_path(), w.reference.line)
        });
        sort_located(&mut self.deepscan_warnings, |w| {
            (w.file_relative_path.as_path(), w.reference.line)
        });
    }
}

fn sort_located<T>(warnings: &mut [T], key: impl Fn(&T) -> (&Path, usize)) {
    warnings.sort_by(|a, b| key(a).cmp(&key(b)));
}

/// A result cut down to a maximum number of warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitedResult {
    /// The kept warnings.
    pub result: CheckResult,
    /// How many warnings were dropped.
    pub omitted: usize,
}

/// Keeps at most `max` warnings, filling dependency warnings first, then
/// match warnings, then deep scan warnings.
#[must_use]
pub fn limit(result: CheckResult, max: usize) -> LimitedResult {
    let total = result.total();
    let mut remaining = max;
    let mut take = |len: usize| {
        let n = len.min(remaining);
        remaining -= n;
        n
    };

    let dependency = take(result.dependency_warnings.len());
    let matched = take(result.match_warnings.len());
    let deepscan = take(result.deepscan_warnings.len());

    let mut limited = result;
    limited.dependency_warnings.truncate(dependency);
    limited.match_warnings.truncate(matched);
    limited.deepscan_warnings.truncate(deepscan);

    let omitted = total - limited.total();
    LimitedResult {
        result: limited,
        omitted,
    }
}
