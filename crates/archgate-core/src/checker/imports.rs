//! Direct import checking.

use tracing::debug;

use super::{CheckContext, CheckError, Checker};
use crate::result::{CheckResult, DependencyWarning, MatchWarning};
use crate::spec::{Component, Spec};
use crate::types::{FileHold, ImportType, Reference, ResolvedImport};

/// Checks every import of every file against its component's allow-lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportsChecker;

impl Checker for ImportsChecker {
    fn name(&self) -> &'static str {
        "imports"
    }

    fn check(
        &self,
        ctx: &CheckContext,
        spec: &Spec,
        files: &[FileHold],
    ) -> Result<CheckResult, CheckError> {
        let mut result = CheckResult::new();

        for hold in files {
            ctx.ensure_active()?;
            let file = &hold.file;
            let relative = file.relative_path(&spec.root_directory);

            let Some(component_id) = &hold.component_id else {
                debug!("{} is not covered by any component", relative.display());
                result.match_warnings.push(MatchWarning {
                    file_relative_path: relative,
                    file_absolute_path: file.path.clone(),
                    reference: Reference::empty(),
                });
                continue;
            };

            let component = spec
                .component(component_id)
                .ok_or_else(|| CheckError::UnknownComponent {
                    component: component_id.clone(),
                    file: file.path.clone(),
                })?;

            for import in &file.imports {
                if is_allowed(spec, component, import)? {
                    continue;
                }
                result.dependency_warnings.push(DependencyWarning {
                    component_name: component.name.value.clone(),
                    file_relative_path: relative.clone(),
                    file_absolute_path: file.path.clone(),
                    resolved_import_name: import.name.clone(),
                    reference: import.reference.clone(),
                });
            }
        }

        result.sort();
        Ok(result)
    }
}

/// Returns true if `component` may depend on `import`.
///
/// Standard library imports are always allowed. Vendor imports are allowed
/// globally, by the component's escape hatch or by a vendor glob. Project
/// imports are allowed by the escape hatch or by exact import path.
///
/// # Errors
///
/// Returns an error if a vendor glob is malformed.
pub fn is_allowed(
    spec: &Spec,
    component: &Component,
    import: &ResolvedImport,
) -> Result<bool, CheckError> {
    match import.import_type {
        ImportType::StdLib => Ok(true),
        ImportType::Vendor => {
            if spec.allow.dep_on_any_vendor.value
                || component.special_flags.allow_all_vendor_deps.value
            {
                return Ok(true);
            }
            for glob in &component.allowed_vendor_globs {
                let matched = glob
                    .value
                    .matches(&import.name)
                    .map_err(|source| CheckError::InvalidVendorGlob {
                        glob: glob.value.as_str().to_string(),
                        reference: glob.reference.clone(),
                        source,
                    })?;
                if matched {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        ImportType::Project => Ok(component.special_flags.allow_all_project_deps.value
            || component
                .allowed_project_imports
                .iter()
                .any(|allowed| allowed.value.import_path == import.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{component, file, import, spec, vendor_glob};
    use crate::types::ProjectFile;
    use std::path::PathBuf;

    fn check(spec: &Spec, files: &[FileHold]) -> Result<CheckResult, CheckError> {
        ImportsChecker.check(&CheckContext::new(), spec, files)
    }

    fn names(result: &CheckResult) -> Vec<&str> {
        result
            .dependency_warnings
            .iter()
            .map(|w| w.resolved_import_name.as_str())
            .collect()
    }

    #[test]
    fn empty_component_table_and_no_files() {
        let result = check(&spec(Vec::new()), &[]).unwrap();
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn stdlib_is_never_flagged() {
        let spec = spec(vec![component("a", &["a"])]);
        let files = [FileHold::owned(
            file("a/a.go", vec![import("fmt", ImportType::StdLib, 3)]),
            "a",
        )];
        assert_eq!(check(&spec, &files).unwrap().total(), 0);
    }

    #[test]
    fn disallowed_project_import() {
        let spec = spec(vec![component("a", &["a"]), component("b", &["b"])]);
        let files = [FileHold::owned(
            file(
                "a/a.go",
                vec![
                    import("example.com/prj/a", ImportType::Project, 3),
                    import("example.com/prj/b", ImportType::Project, 4),
                ],
            ),
            "a",
        )];

        let result = check(&spec, &files).unwrap();
        assert_eq!(result.dependency_warnings.len(), 1);
        let warning = &result.dependency_warnings[0];
        assert_eq!(warning.component_name, "a");
        assert_eq!(warning.resolved_import_name, "example.com/prj/b");
        assert_eq!(warning.file_relative_path, PathBuf::from("a/a.go"));
        assert_eq!(warning.file_absolute_path, PathBuf::from("/prj/a/a.go"));
        assert_eq!(warning.reference.line, 4);
    }

    #[test]
    fn allowed_project_import_requires_exact_path() {
        let mut a = component("a", &["a"]);
        a.allowed_project_imports
            .extend(component("b", &["b"]).resolved_paths);
        let spec = spec(vec![a, component("b", &["b"])]);
        let files = [FileHold::owned(
            file(
                "a/a.go",
                vec![
                    import("example.com/prj/b", ImportType::Project, 3),
                    import("example.com/prj/b/sub", ImportType::Project, 4),
                ],
            ),
            "a",
        )];
        assert_eq!(
            names(&check(&spec, &files).unwrap()),
            vec!["example.com/prj/b/sub"]
        );
    }

    #[test]
    fn allow_all_project_deps_escape_hatch() {
        let mut a = component("a", &["a"]);
        a.special_flags.allow_all_project_deps.value = true;
        let spec = spec(vec![a]);
        let files = [FileHold::owned(
            file("a/a.go", vec![import("example.com/prj/z", ImportType::Project, 3)]),
            "a",
        )];
        assert_eq!(check(&spec, &files).unwrap().total(), 0);
    }

    #[test]
    fn vendor_import_matching_glob() {
        let mut a = component("a", &["a"]);
        a.allowed_vendor_globs.push(vendor_glob("example.com/libx/**", 9));
        let spec = spec(vec![a]);
        let files = [FileHold::owned(
            file(
                "a/a.go",
                vec![
                    import("example.com/libx/sub", ImportType::Vendor, 3),
                    import("example.com/liby", ImportType::Vendor, 4),
                ],
            ),
            "a",
        )];
        assert_eq!(names(&check(&spec, &files).unwrap()), vec!["example.com/liby"]);
    }

    #[test]
    fn allow_all_vendor_deps_escape_hatch() {
        let mut a = component("a", &["a"]);
        a.special_flags.allow_all_vendor_deps.value = true;
        let spec = spec(vec![a]);
        let files = [FileHold::owned(
            file("a/a.go", vec![import("example.com/liby", ImportType::Vendor, 3)]),
            "a",
        )];
        assert_eq!(check(&spec, &files).unwrap().total(), 0);
    }

    #[test]
    fn dep_on_any_vendor_allows_every_vendor() {
        let mut spec = spec(vec![component("a", &["a"])]);
        spec.allow.dep_on_any_vendor.value = true;
        let files = [FileHold::owned(
            file(
                "a/a.go",
                vec![
                    import("example.com/liby", ImportType::Vendor, 3),
                    import("example.com/prj/b", ImportType::Project, 4),
                ],
            ),
            "a",
        )];
        assert_eq!(
            names(&check(&spec, &files).unwrap()),
            vec!["example.com/prj/b"]
        );
    }

    #[test]
    fn malformed_vendor_glob_is_hard_error() {
        let mut a = component("a", &["a"]);
        a.allowed_vendor_globs.push(vendor_glob("example.com/[x", 12));
        let spec = spec(vec![a]);
        let files = [FileHold::owned(
            file("a/a.go", vec![import("example.com/x", ImportType::Vendor, 3)]),
            "a",
        )];
        match check(&spec, &files).unwrap_err() {
            CheckError::InvalidVendorGlob { glob, reference, .. } => {
                assert_eq!(glob, "example.com/[x");
                assert_eq!(reference.line, 12);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unmatched_file_yields_match_warning() {
        let spec = spec(vec![component("a", &["a"])]);
        let files = [FileHold::unmatched(ProjectFile::new(
            "/prj/main.go",
            vec![import("example.com/prj/a", ImportType::Project, 3)],
        ))];

        let result = check(&spec, &files).unwrap();
        assert!(result.dependency_warnings.is_empty());
        assert_eq!(result.match_warnings.len(), 1);
        let warning = &result.match_warnings[0];
        assert_eq!(warning.file_relative_path, PathBuf::from("main.go"));
        assert_eq!(warning.file_absolute_path, PathBuf::from("/prj/main.go"));
        assert!(!warning.reference.is_valid());
    }

    #[test]
    fn unknown_component_is_hard_error() {
        let spec = spec(vec![component("a", &["a"])]);
        let files = [FileHold::owned(file("a/a.go", vec![]), "ghost")];
        assert!(matches!(
            check(&spec, &files),
            Err(CheckError::UnknownComponent { component, .. }) if component == "ghost"
        ));
    }

    #[test]
    fn warnings_sorted_by_path_then_line() {
        let spec = spec(vec![component("a", &["a"]), component("b", &["b"])]);
        let files = [
            FileHold::owned(
                file(
                    "b/b.go",
                    vec![import("example.com/prj/a", ImportType::Project, 2)],
                ),
                "b",
            ),
            FileHold::owned(
                file(
                    "a/a.go",
                    vec![
                        import("example.com/prj/b", ImportType::Project, 7),
                        import("example.com/prj/b/x", ImportType::Project, 5),
                    ],
                ),
                "a",
            ),
        ];

        let result = check(&spec, &files).unwrap();
        let order: Vec<(String, usize)> = result
            .dependency_warnings
            .iter()
            .map(|w| (w.file_relative_path.display().to_string(), w.reference.line))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a/a.go".to_string(), 5),
                ("a/a.go".to_string(), 7),
                ("b/b.go".to_string(), 2),
            ]
        );
    }

    #[test]
    fn cancelled_before_first_file() {
        let spec = spec(vec![component("a", &["a"])]);
        let files = [FileHold::owned(file("a/a.go", vec![]), "a")];
        let ctx = CheckContext::new();
        ctx.cancel();
        assert!(matches!(
            ImportsChecker.check(&ctx, &spec, &files),
            Err(CheckError::Cancelled)
        ));
    }
}
