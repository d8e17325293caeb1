//! In-memory fixtures for unit tests. Project root `/prj`, module
//! `example.com/prj`.

use std::path::PathBuf;

use crate::spec::{Allow, Component, Integrity, SpecialFlags, Spec};
use crate::types::{
    Glob, ImportType, Injection, InjectionGate, ProjectFile, Referable, Reference, ResolvedImport,
    ResolvedPath,
};

pub(crate) const ROOT: &str = "/prj";
pub(crate) const MODULE: &str = "example.com/prj";

fn spec_ref(line: usize) -> Reference {
    Reference::new("/prj/archgate.toml", line, 1)
}

pub(crate) fn resolved(local: &str) -> Referable<ResolvedPath> {
    Referable::new(
        ResolvedPath {
            import_path: format!("{MODULE}/{local}"),
            local_path: local.to_string(),
            abs_path: PathBuf::from(ROOT).join(local),
        },
        spec_ref(2),
    )
}

/// A component owning `locals`, allowed to import only itself.
pub(crate) fn component(name: &str, locals: &[&str]) -> Component {
    let paths: Vec<_> = locals.iter().map(|l| resolved(l)).collect();
    Component {
        name: Referable::new(name.to_string(), spec_ref(1)),
        deep_scan: Referable::new(true, spec_ref(1)),
        resolved_paths: paths.clone(),
        may_depend_on: Vec::new(),
        can_use: Vec::new(),
        allowed_project_imports: paths,
        allowed_vendor_globs: Vec::new(),
        special_flags: SpecialFlags {
            allow_all_project_deps: Referable::new(false, spec_ref(1)),
            allow_all_vendor_deps: Referable::new(false, spec_ref(1)),
        },
    }
}

pub(crate) fn vendor_glob(pattern: &str, line: usize) -> Referable<Glob> {
    Referable::new(Glob::new(pattern), spec_ref(line))
}

pub(crate) fn spec(components: Vec<Component>) -> Spec {
    Spec {
        module_name: MODULE.to_string(),
        root_directory: PathBuf::from(ROOT),
        working_directory: Referable::new(String::new(), spec_ref(1)),
        components,
        exclude: Vec::new(),
        exclude_files_matcher: Vec::new(),
        allow: Allow {
            dep_on_any_vendor: Referable::new(false, spec_ref(1)),
            deep_scan: Referable::new(true, spec_ref(1)),
        },
        integrity: Integrity::default(),
    }
}

/// A file at `ROOT/relative`; imports reference that file.
pub(crate) fn file(relative: &str, imports: Vec<ResolvedImport>) -> ProjectFile {
    let path = PathBuf::from(ROOT).join(relative);
    let imports = imports
        .into_iter()
        .map(|mut import| {
            import.reference.file = path.clone();
            import
        })
        .collect();
    ProjectFile::new(path, imports)
}

pub(crate) fn import(name: &str, import_type: ImportType, line: usize) -> ResolvedImport {
    ResolvedImport::new(name, import_type, Reference::new("", line, 2))
}

pub(crate) fn injection(gate_package: &str, method: &str, dependency: ResolvedImport) -> Injection {
    Injection {
        gate: InjectionGate {
            import_path: gate_package.to_string(),
            method: method.to_string(),
            definition: Reference::new("/prj/a/service.go", 20, 1),
        },
        dependency,
    }
}
