//! Document → [`Spec`] assembly.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use super::document::{Document, DocumentComponent};
use super::{Allow, Component, Integrity, SpecialFlags, Spec};
use crate::resolver::{local_glob, ResolveError, Resolver};
use crate::types::{Glob, Referable, Reference, ResolvedPath};

/// Errors that prevent assembly.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// A directory glob could not be expanded.
    #[error("{reference}: cannot resolve '{glob}': {source}")]
    Resolve {
        /// The project-relative glob.
        glob: String,
        /// Where the glob was declared.
        reference: Reference,
        /// Underlying error.
        source: ResolveError,
    },
}

/// Builds a [`Spec`] from a decoded document.
#[derive(Debug)]
pub struct Assembler<'a> {
    resolver: &'a Resolver,
}

impl<'a> Assembler<'a> {
    /// Creates an assembler resolving globs with `resolver`.
    #[must_use]
    pub fn new(resolver: &'a Resolver) -> Self {
        Self { resolver }
    }

    /// Assembles `document`. The result has no document notices; the caller
    /// attaches them.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory glob cannot be expanded.
    pub fn assemble(&self, document: &Document) -> Result<Spec, AssembleError> {
        let workdir = document.working_directory();

        let mut exclude = Vec::new();
        for glob in document.exclude() {
            exclude.extend(self.resolve(&workdir.value, glob)?);
        }

        let exclude_files_matcher: Vec<Referable<Regex>> = document
            .exclude_files()
            .iter()
            .filter_map(|pattern| match Regex::new(&pattern.value) {
                Ok(regex) => Some(pattern.with_value(regex)),
                Err(err) => {
                    warn!(
                        "Ignoring invalid exclude-files regex '{}' at {}: {}",
                        pattern.value, pattern.reference, err
                    );
                    None
                }
            })
            .collect();

        let allow = Allow {
            dep_on_any_vendor: document.allow().dep_on_any_vendor().clone(),
            deep_scan: document.allow().deep_scan().clone(),
        };

        // Own directories first; allow-lists refer to other components' paths.
        let mut owned: Vec<(&DocumentComponent, Vec<Referable<ResolvedPath>>)> = Vec::new();
        let mut seen = HashSet::new();
        for component in document.components() {
            if !seen.insert(component.name().value.as_str()) {
                debug!(
                    "Skipping duplicate component '{}' at {}",
                    component.name().value,
                    component.reference()
                );
                continue;
            }
            let mut paths = Vec::new();
            for glob in component.paths() {
                paths.extend(self.resolve(&workdir.value, glob)?);
            }
            owned.push((component, paths));
        }
        let paths_by_name: HashMap<&str, &[Referable<ResolvedPath>]> = owned
            .iter()
            .map(|(c, paths)| (c.name().value.as_str(), paths.as_slice()))
            .collect();

        let components = owned
            .iter()
            .map(|(component, paths)| Component {
                name: component.name().clone(),
                deep_scan: component
                    .deep_scan()
                    .cloned()
                    .unwrap_or_else(|| allow.deep_scan.clone()),
                resolved_paths: paths.clone(),
                may_depend_on: component.may_depend_on().to_vec(),
                can_use: component.can_use().to_vec(),
                allowed_project_imports: project_imports(document, component, &paths_by_name),
                allowed_vendor_globs: vendor_globs(document, component),
                special_flags: SpecialFlags {
                    allow_all_project_deps: component.any_project_deps().clone(),
                    allow_all_vendor_deps: component.any_vendor_deps().clone(),
                },
            })
            .collect::<Vec<_>>();

        debug!(
            "Assembled {} component(s), {} excluded dir(s), {} file matcher(s)",
            components.len(),
            exclude.len(),
            exclude_files_matcher.len()
        );

        Ok(Spec {
            module_name: self.resolver.module_name().to_string(),
            root_directory: self.resolver.root_directory().to_path_buf(),
            working_directory: workdir.clone(),
            components,
            exclude,
            exclude_files_matcher,
            allow,
            integrity: Integrity::default(),
        })
    }

    fn resolve(
        &self,
        workdir: &str,
        glob: &Referable<String>,
    ) -> Result<Vec<Referable<ResolvedPath>>, AssembleError> {
        let local = glob.with_value(local_glob(workdir, &glob.value));
        self.resolver
            .resolve_referable(&local)
            .map_err(|source| AssembleError::Resolve {
                glob: local.value.clone(),
                reference: glob.reference.clone(),
                source,
            })
    }
}

/// Own paths, then `may-depend-on` targets, then common components; first
/// grant of an import path wins.
fn project_imports(
    document: &Document,
    component: &DocumentComponent,
    paths_by_name: &HashMap<&str, &[Referable<ResolvedPath>]>,
) -> Vec<Referable<ResolvedPath>> {
    let grants = std::iter::once(component.name())
        .chain(component.may_depend_on())
        .chain(document.common_components());

    let mut seen = HashSet::new();
    let mut allowed = Vec::new();
    for grant in grants {
        let Some(paths) = paths_by_name.get(grant.value.as_str()) else {
            continue;
        };
        for path in *paths {
            if seen.insert(path.value.import_path.clone()) {
                allowed.push(grant.with_value(path.value.clone()));
            }
        }
    }
    allowed
}

/// Import paths of `can-use` and common vendors, referencing the vendor
/// declaration.
fn vendor_globs(document: &Document, component: &DocumentComponent) -> Vec<Referable<Glob>> {
    let mut seen = HashSet::new();
    let mut globs = Vec::new();
    for name in component.can_use().iter().chain(document.common_vendors()) {
        let Some(vendor) = document.vendor(&name.value) else {
            continue;
        };
        for import_path in vendor.import_paths() {
            if seen.insert(import_path.value.as_str()) {
                globs.push(Referable::new(
                    Glob::new(import_path.value.as_str()),
                    vendor.reference().clone(),
                ));
            }
        }
    }
    globs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::decoder::Decoder;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn assemble(dirs: &[&str], src: &str) -> (TempDir, Spec) {
        let tmp = TempDir::new().unwrap();
        for dir in dirs {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
        }
        let resolver = Resolver::with_glob(tmp.path(), "example.com/prj");
        let decoded = Decoder::new()
            .decode_str(Path::new("archgate.toml"), src)
            .unwrap();
        let spec = Assembler::new(&resolver).assemble(&decoded.document).unwrap();
        (tmp, spec)
    }

    fn imports(component: &Component) -> Vec<&str> {
        component
            .allowed_project_imports
            .iter()
            .map(|p| p.value.import_path.as_str())
            .collect()
    }

    const DOC: &str = r#"version = 3
workdir = "internal"
common-components = ["models"]
common-vendors = ["log"]

[[vendors]]
name = "log"
in = ["example.com/log", "example.com/log/**"]

[[vendors]]
name = "orm"
in = ["example.com/orm/**"]

[[components]]
name = "models"
in = ["models"]

[[components]]
name = "a"
in = ["a"]
may-depend-on = ["b", "models"]
can-use = ["orm", "ghost"]
any-vendor-deps = true

[[components]]
name = "b"
in = ["b", "b/*"]
deep-scan = false
"#;

    const DIRS: &[&str] = &["internal/a", "internal/b/inner", "internal/models"];

    #[test]
    fn resolves_component_paths() {
        let (_tmp, spec) = assemble(DIRS, DOC);
        let b = spec.component("b").unwrap();
        let paths: Vec<&str> = b
            .resolved_paths
            .iter()
            .map(|p| p.value.local_path.as_str())
            .collect();
        assert_eq!(paths, vec!["internal/b", "internal/b/inner"]);
        assert!(b.resolved_paths.iter().all(|p| p.reference.line == 27));
    }

    #[test]
    fn project_imports_cover_self_deps_and_common() {
        let (_tmp, spec) = assemble(DIRS, DOC);
        let a = spec.component("a").unwrap();
        assert_eq!(
            imports(a),
            vec![
                "example.com/prj/internal/a",
                "example.com/prj/internal/b",
                "example.com/prj/internal/b/inner",
                "example.com/prj/internal/models",
            ]
        );
        // models is granted by may-depend-on before common-components.
        assert_eq!(a.allowed_project_imports[3].reference.line, 21);
        assert_eq!(a.allowed_project_imports[0].reference.line, 19);
    }

    #[test]
    fn vendor_globs_reference_vendor_declaration() {
        let (_tmp, spec) = assemble(DIRS, DOC);
        let a = spec.component("a").unwrap();
        let globs: Vec<(&str, usize)> = a
            .allowed_vendor_globs
            .iter()
            .map(|g| (g.value.as_str(), g.reference.line))
            .collect();
        assert_eq!(
            globs,
            vec![
                ("example.com/orm/**", 11),
                ("example.com/log", 7),
                ("example.com/log/**", 7),
            ]
        );
    }

    #[test]
    fn flags_and_deep_scan_inheritance() {
        let (_tmp, spec) = assemble(DIRS, DOC);
        let a = spec.component("a").unwrap();
        assert!(a.special_flags.allow_all_vendor_deps.value);
        assert!(!a.special_flags.allow_all_project_deps.value);
        assert!(a.deep_scan.value);
        assert!(!spec.component("b").unwrap().deep_scan.value);
        assert!(spec.allow.deep_scan.value);
        assert!(!spec.allow.dep_on_any_vendor.value);
    }

    #[test]
    fn invalid_exclude_regex_is_dropped() {
        let (_tmp, spec) = assemble(
            &["gen"],
            "version = 3\nexclude = [\"gen\"]\nexclude-files = [\"(bad\", \"_test\\\\.go$\"]\n",
        );
        assert_eq!(spec.exclude.len(), 1);
        assert_eq!(spec.exclude[0].value.local_path, "gen");
        assert_eq!(spec.exclude_files_matcher.len(), 1);
        assert_eq!(spec.exclude_files_matcher[0].reference.line, 3);
    }

    #[test]
    fn empty_component_table() {
        let (_tmp, spec) = assemble(&[], "version = 2\n");
        assert!(spec.components.is_empty());
        assert!(!spec.allow.deep_scan.value);
    }

    #[test]
    fn duplicate_component_keeps_first() {
        let (_tmp, spec) = assemble(
            &["a", "b"],
            "version = 3\n[[components]]\nname = \"a\"\nin = [\"a\"]\n[[components]]\nname = \"a\"\nin = [\"b\"]\n",
        );
        assert_eq!(spec.components.len(), 1);
        assert_eq!(spec.components[0].resolved_paths[0].value.local_path, "a");
    }

    #[test]
    fn invalid_directory_glob_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let resolver = Resolver::with_glob(tmp.path(), "example.com/prj");
        let decoded = Decoder::new()
            .decode_str(
                Path::new("archgate.toml"),
                "version = 3\n[[components]]\nname = \"a\"\nin = [\"a**\"]\n",
            )
            .unwrap();
        let err = Assembler::new(&resolver)
            .assemble(&decoded.document)
            .unwrap_err();
        let AssembleError::Resolve { reference, .. } = err;
        assert_eq!(reference.line, 4);
    }
}
