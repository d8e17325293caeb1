//! Glob/path resolution: project-relative globs to concrete directories.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::types::{Referable, ResolvedPath};

/// Errors from expanding a glob on disk.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The glob pattern has invalid syntax.
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        /// The absolute pattern that failed.
        pattern: String,
        /// Underlying glob error.
        source: glob::PatternError,
    },

    /// A matched entry could not be read.
    #[error("failed to resolve path '{pattern}': {source}")]
    Io {
        /// The absolute pattern that failed.
        pattern: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Expands an absolute glob into matching directories.
pub trait PathResolver: Send + Sync {
    /// Returns the directories matching `abs_glob`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is malformed or the filesystem walk fails.
    fn resolve(&self, abs_glob: &str) -> Result<Vec<PathBuf>, ResolveError>;
}

/// [`PathResolver`] backed by the `glob` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobPathResolver;

impl PathResolver for GlobPathResolver {
    fn resolve(&self, abs_glob: &str) -> Result<Vec<PathBuf>, ResolveError> {
        let entries = glob::glob(abs_glob).map_err(|source| ResolveError::Pattern {
            pattern: abs_glob.to_string(),
            source,
        })?;

        let mut found = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| ResolveError::Io {
                pattern: abs_glob.to_string(),
                source: e.into(),
            })?;
            if path.is_dir() {
                found.push(path);
            }
        }

        Ok(found)
    }
}

/// Resolves project-relative globs into [`ResolvedPath`]s.
pub struct Resolver {
    path_resolver: Box<dyn PathResolver>,
    root_directory: PathBuf,
    module_name: String,
}

impl Resolver {
    /// Creates a resolver rooted at `root_directory`.
    #[must_use]
    pub fn new(
        path_resolver: Box<dyn PathResolver>,
        root_directory: impl Into<PathBuf>,
        module_name: impl Into<String>,
    ) -> Self {
        Self {
            path_resolver,
            root_directory: root_directory.into(),
            module_name: module_name.into(),
        }
    }

    /// Creates a resolver using [`GlobPathResolver`].
    #[must_use]
    pub fn with_glob(root_directory: impl Into<PathBuf>, module_name: impl Into<String>) -> Self {
        Self::new(Box::new(GlobPathResolver), root_directory, module_name)
    }

    /// Returns the project root.
    #[must_use]
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// Returns the module name used to build import paths.
    #[must_use]
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Expands a glob relative to the project root.
    ///
    /// An empty match set is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the underlying glob expansion fails.
    pub fn resolve_local_glob(&self, local_glob: &str) -> Result<Vec<ResolvedPath>, ResolveError> {
        let root = self.root_directory.to_string_lossy();
        let mut abs_glob = glob::Pattern::escape(root.trim_end_matches('/'));
        let local_glob = local_glob.trim_matches('/');
        if !local_glob.is_empty() {
            abs_glob.push('/');
            abs_glob.push_str(local_glob);
        }

        let resolved = self.path_resolver.resolve(&abs_glob)?;
        debug!("Resolved '{}' into {} path(s)", abs_glob, resolved.len());

        Ok(resolved
            .into_iter()
            .map(|abs| self.resolved_path(&abs))
            .collect())
    }

    /// Expands a referable glob; every result inherits the input's reference.
    ///
    /// # Errors
    ///
    /// Returns an error only if the underlying glob expansion fails.
    pub fn resolve_referable(
        &self,
        local_glob: &Referable<String>,
    ) -> Result<Vec<Referable<ResolvedPath>>, ResolveError> {
        Ok(self
            .resolve_local_glob(&local_glob.value)?
            .into_iter()
            .map(|path| local_glob.with_value(path))
            .collect())
    }

    fn resolved_path(&self, abs: &Path) -> ResolvedPath {
        let abs_path = normalize(abs);
        let local_path = abs_path
            .strip_prefix(normalize(&self.root_directory))
            .map_or_else(|_| abs_path.to_string_lossy().into_owned(), to_slash)
            .trim_end_matches('/')
            .to_string();

        let import_path = if local_path.is_empty() {
            self.module_name.trim_end_matches('/').to_string()
        } else {
            format!("{}/{}", self.module_name, local_path)
                .trim_end_matches('/')
                .to_string()
        };

        ResolvedPath {
            import_path,
            local_path,
            abs_path,
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("root_directory", &self.root_directory)
            .field("module_name", &self.module_name)
            .finish_non_exhaustive()
    }
}

/// Joins a working directory and a glob into one cleaned project-relative glob.
///
/// `("internal", "a/**")` becomes `internal/a/**`; `("", "./a")` becomes `a`.
#[must_use]
pub fn local_glob(workdir: &str, glob: &str) -> String {
    clean_slash_path(&format!(
        "{}/{}",
        workdir.trim_end_matches('/'),
        glob.trim_start_matches('/')
    ))
}

/// Lexically cleans a `/` separated relative path.
///
/// Drops empty and `.` segments and folds `..` into its parent where possible.
/// Returns an empty string for the root itself.
#[must_use]
pub fn clean_slash_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." if parts.last().is_some_and(|last| *last != "..") => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Lexically normalizes a filesystem path (no symlink resolution).
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
