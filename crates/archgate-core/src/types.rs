//! Core value types: references, referable values, notices and the
//! classified project files consumed by the checkers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Source location inside the spec document or a project source file.
///
/// A reference with `line == 0` is *empty*: the value it annotates has no
/// single source position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// File the location points into.
    pub file: PathBuf,
    /// Line number (1-indexed, 0 for an empty reference).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Reference {
    /// Creates a new reference with explicit values.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Creates a reference that points nowhere.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if this reference points at a real location.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.line > 0
    }

    /// Widens this reference to a line window for source previews.
    ///
    /// The window never starts before line 1.
    #[must_use]
    pub fn extend_range(&self, before: usize, after: usize) -> SourceRange {
        SourceRange {
            file: self.file.clone(),
            line_from: self.line.saturating_sub(before).max(1),
            line_to: self.line + after,
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
        } else {
            write!(f, "{}", self.file.display())
        }
    }
}

/// A line window around a [`Reference`], produced by [`Reference::extend_range`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRange {
    /// File the window points into.
    pub file: PathBuf,
    /// First line of the window (inclusive).
    pub line_from: usize,
    /// Last line of the window (inclusive).
    pub line_to: usize,
    /// The highlighted line.
    pub line: usize,
    /// The highlighted column.
    pub column: usize,
}

impl SourceRange {
    /// Returns true if `line` falls inside the window.
    #[must_use]
    pub fn contains(&self, line: usize) -> bool {
        (self.line_from..=self.line_to).contains(&line)
    }
}

/// A value paired with the document location it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Referable<T> {
    /// The value.
    pub value: T,
    /// Where the value came from.
    pub reference: Reference,
}

impl<T> Referable<T> {
    /// Pairs a value with its reference.
    #[must_use]
    pub fn new(value: T, reference: Reference) -> Self {
        Self { value, reference }
    }

    /// Transforms the value, keeping the original reference.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Referable<U> {
        Referable {
            value: f(self.value),
            reference: self.reference,
        }
    }

    /// Pairs another value with this value's reference.
    #[must_use]
    pub fn with_value<U>(&self, value: U) -> Referable<U> {
        Referable {
            value,
            reference: self.reference.clone(),
        }
    }
}

/// A non-fatal structural problem found in the spec document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Human-readable description.
    pub message: String,
    /// Location of the offending declaration.
    pub reference: Reference,
}

impl Notice {
    /// Creates a new notice.
    #[must_use]
    pub fn new(message: impl Into<String>, reference: Reference) -> Self {
        Self {
            message: message.into(),
            reference,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reference, self.message)
    }
}

/// The three equivalent addressings of one resolved directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedPath {
    /// `module/local/path`.
    pub import_path: String,
    /// Path relative to the project root, without trailing slash.
    pub local_path: String,
    /// Cleaned absolute path.
    pub abs_path: PathBuf,
}

/// An import-path glob (e.g. `example.com/log/**`).
///
/// The pattern is stored as written; syntax errors surface on [`Glob::matches`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Glob(String);

impl Glob {
    /// Wraps a raw pattern.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// Returns the raw pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tests an import path against this glob.
    ///
    /// `*` stays within one `/` separated segment, `**` spans segments.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is malformed.
    pub fn matches(&self, candidate: &str) -> Result<bool, glob::PatternError> {
        let pattern = glob::Pattern::new(&self.0)?;
        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        Ok(pattern.matches_with(candidate, options))
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification of one import, assigned by the external import classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportType {
    /// Standard library of the checked language.
    StdLib,
    /// Third-party package.
    Vendor,
    /// Package inside the checked project.
    Project,
}

impl fmt::Display for ImportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StdLib => write!(f, "stdlib"),
            Self::Vendor => write!(f, "vendor"),
            Self::Project => write!(f, "project"),
        }
    }
}

/// One classified import of a project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedImport {
    /// Full import path.
    pub name: String,
    /// Classification.
    pub import_type: ImportType,
    /// Location of the import statement.
    pub reference: Reference,
}

impl ResolvedImport {
    /// Creates a new resolved import.
    #[must_use]
    pub fn new(name: impl Into<String>, import_type: ImportType, reference: Reference) -> Self {
        Self {
            name: name.into(),
            import_type,
            reference,
        }
    }
}

/// A method accepting an abstraction, into which implementations get injected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionGate {
    /// Import path of the package declaring the method.
    pub import_path: String,
    /// Method name (e.g. `Service.SetStore`).
    pub method: String,
    /// Location of the method definition.
    pub definition: Reference,
}

/// A dependency-injection site found by the external analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Injection {
    /// The receiving method.
    pub gate: InjectionGate,
    /// Package of the injected implementation; its reference is the injection site.
    pub dependency: ResolvedImport,
}

/// A project source file with its classified imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Classified imports.
    #[serde(default)]
    pub imports: Vec<ResolvedImport>,
    /// Injection sites (only used by the deep scan).
    #[serde(default)]
    pub injections: Vec<Injection>,
}

impl ProjectFile {
    /// Creates a file with imports and no injections.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, imports: Vec<ResolvedImport>) -> Self {
        Self {
            path: path.into(),
            imports,
            injections: Vec::new(),
        }
    }

    /// Adds an injection site.
    #[must_use]
    pub fn with_injection(mut self, injection: Injection) -> Self {
        self.injections.push(injection);
        self
    }

    /// Returns the path relative to `root`, or the full path if it is outside.
    #[must_use]
    pub fn relative_path(&self, root: &Path) -> PathBuf {
        self.path
            .strip_prefix(root)
            .map_or_else(|_| self.path.clone(), Path::to_path_buf)
    }
}

/// A project file paired with the component that claims it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHold {
    /// The file.
    pub file: ProjectFile,
    /// Owning component, if any component claims the file.
    #[serde(default)]
    pub component_id: Option<String>,
}

impl FileHold {
    /// Creates a hold for a file owned by `component`.
    #[must_use]
    pub fn owned(file: ProjectFile, component: impl Into<String>) -> Self {
        Self {
            file,
            component_id: Some(component.into()),
        }
    }

    /// Creates a hold for a file no component claims.
    #[must_use]
    pub fn unmatched(file: ProjectFile) -> Self {
        Self {
            file,
            component_id: None,
        }
    }
}
