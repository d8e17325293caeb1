//! Spec document resolution.
//!
//! Resolves the spec path using a deterministic priority order:
//!
//! 1. `--spec` flag: a file is taken as-is, a directory is searched for the
//!    project spec names
//! 2. `{project}/archgate.toml` or `.archgate.toml`
//! 3. Nothing found → error at the call site

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Where the spec document was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    /// Explicitly specified via `--spec` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// No spec document found.
    NotFound,
}

impl SpecSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) => Some(p),
            Self::NotFound => None,
        }
    }
}

/// Project-level spec file names, checked in order.
const PROJECT_SPEC_NAMES: &[&str] = &["archgate.toml", ".archgate.toml"];

/// Resolves the spec document path.
///
/// A missing explicit file is passed through so the loader reports it with
/// its own error. An explicit directory without a spec file is an error.
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> Result<SpecSource> {
    if let Some(p) = explicit {
        if !p.is_dir() {
            return Ok(SpecSource::Explicit(p.to_path_buf()));
        }
        return match find_in(p) {
            Some(found) => Ok(SpecSource::Explicit(found)),
            None => bail!(
                "--spec points to directory {} without {}",
                p.display(),
                PROJECT_SPEC_NAMES.join(" or ")
            ),
        };
    }

    Ok(find_in(project_dir).map_or(SpecSource::NotFound, SpecSource::Project))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    PROJECT_SPEC_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
        .inspect(|found| tracing::debug!("Found spec: {}", found.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_file_wins_over_project_spec() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("layers.toml");
        fs::write(&explicit, "").unwrap();
        let project = tmp.path().join("project");
        fs::create_dir(&project).unwrap();
        fs::write(project.join("archgate.toml"), "").unwrap();

        let source = resolve(&project, Some(&explicit)).unwrap();
        assert_eq!(source, SpecSource::Explicit(explicit));
    }

    #[test]
    fn missing_explicit_file_is_passed_through() {
        let source = resolve(Path::new("/tmp"), Some(Path::new("/nonexistent.toml"))).unwrap();
        assert_eq!(source.path(), Some(Path::new("/nonexistent.toml")));
    }

    #[test]
    fn explicit_directory_is_searched() {
        let tmp = TempDir::new().unwrap();
        let specs = tmp.path().join("specs");
        fs::create_dir(&specs).unwrap();
        fs::write(specs.join(".archgate.toml"), "").unwrap();

        let source = resolve(tmp.path(), Some(&specs)).unwrap();
        assert_eq!(source, SpecSource::Explicit(specs.join(".archgate.toml")));
    }

    #[test]
    fn explicit_directory_without_spec_is_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("archgate.toml"), "").unwrap();
        let empty = tmp.path().join("empty");
        fs::create_dir(&empty).unwrap();

        let err = resolve(tmp.path(), Some(&empty)).unwrap_err();
        assert!(err.to_string().contains("without archgate.toml"));
    }

    #[test]
    fn project_spec_names_in_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".archgate.toml"), "").unwrap();
        assert_eq!(
            resolve(tmp.path(), None).unwrap(),
            SpecSource::Project(tmp.path().join(".archgate.toml"))
        );

        fs::write(tmp.path().join("archgate.toml"), "").unwrap();
        assert_eq!(
            resolve(tmp.path(), None).unwrap(),
            SpecSource::Project(tmp.path().join("archgate.toml"))
        );
    }

    #[test]
    fn directory_named_like_spec_is_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("archgate.toml")).unwrap();

        assert_eq!(resolve(tmp.path(), None).unwrap(), SpecSource::NotFound);
    }

    #[test]
    fn not_found_has_no_path() {
        let tmp = TempDir::new().unwrap();
        let source = resolve(tmp.path(), None).unwrap();
        assert!(source.path().is_none());
    }
}
