//! Decoded architecture document.
//!
//! This is the raw, not-yet-merged form of the spec: still close to its
//! textual declaration, with every value carrying the [`Reference`] of the
//! place it was written. Built by the decoder, read by the validator and
//! the assembler, never mutated afterwards.

use std::path::{Path, PathBuf};

use crate::types::{Referable, Reference};

/// Global allow flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAllow {
    pub(crate) dep_on_any_vendor: Referable<bool>,
    pub(crate) deep_scan: Referable<bool>,
}

impl DocumentAllow {
    /// Whether every component may import any vendor package.
    #[must_use]
    pub fn dep_on_any_vendor(&self) -> &Referable<bool> {
        &self.dep_on_any_vendor
    }

    /// Whether the deep scan is enabled by default.
    #[must_use]
    pub fn deep_scan(&self) -> &Referable<bool> {
        &self.deep_scan
    }
}

/// A `[[vendors]]` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentVendor {
    pub(crate) name: Referable<String>,
    pub(crate) import_paths: Vec<Referable<String>>,
}

impl DocumentVendor {
    /// Returns the vendor name.
    #[must_use]
    pub fn name(&self) -> &Referable<String> {
        &self.name
    }

    /// Returns the import-path globs.
    #[must_use]
    pub fn import_paths(&self) -> &[Referable<String>] {
        &self.import_paths
    }

    /// Location of the declaration.
    #[must_use]
    pub fn reference(&self) -> &Reference {
        &self.name.reference
    }
}

/// A `[[components]]` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentComponent {
    pub(crate) name: Referable<String>,
    pub(crate) paths: Vec<Referable<String>>,
    pub(crate) may_depend_on: Vec<Referable<String>>,
    pub(crate) can_use: Vec<Referable<String>>,
    pub(crate) any_project_deps: Referable<bool>,
    pub(crate) any_vendor_deps: Referable<bool>,
    pub(crate) deep_scan: Option<Referable<bool>>,
}

impl DocumentComponent {
    /// Returns the component name.
    #[must_use]
    pub fn name(&self) -> &Referable<String> {
        &self.name
    }

    /// Returns the directory globs (`in`), relative to the working directory.
    #[must_use]
    pub fn paths(&self) -> &[Referable<String>] {
        &self.paths
    }

    /// Returns the components this one may depend on.
    #[must_use]
    pub fn may_depend_on(&self) -> &[Referable<String>] {
        &self.may_depend_on
    }

    /// Returns the vendors this one may use.
    #[must_use]
    pub fn can_use(&self) -> &[Referable<String>] {
        &self.can_use
    }

    /// Returns the `any-project-deps` flag.
    #[must_use]
    pub fn any_project_deps(&self) -> &Referable<bool> {
        &self.any_project_deps
    }

    /// Returns the `any-vendor-deps` flag.
    #[must_use]
    pub fn any_vendor_deps(&self) -> &Referable<bool> {
        &self.any_vendor_deps
    }

    /// Returns the deep scan override, if declared.
    #[must_use]
    pub fn deep_scan(&self) -> Option<&Referable<bool>> {
        self.deep_scan.as_ref()
    }

    /// Location of the declaration.
    #[must_use]
    pub fn reference(&self) -> &Reference {
        &self.name.reference
    }
}

/// The decoded architecture document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub(crate) path: PathBuf,
    pub(crate) version: Referable<i64>,
    pub(crate) working_directory: Referable<String>,
    pub(crate) allow: DocumentAllow,
    pub(crate) exclude: Vec<Referable<String>>,
    pub(crate) exclude_files: Vec<Referable<String>>,
    pub(crate) common_components: Vec<Referable<String>>,
    pub(crate) common_vendors: Vec<Referable<String>>,
    pub(crate) vendors: Vec<DocumentVendor>,
    pub(crate) components: Vec<DocumentComponent>,
}

impl Document {
    /// Creates an empty document, used when the text does not fit the schema.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let start = Reference::new(path.clone(), 1, 1);
        Self {
            version: Referable::new(0, start.clone()),
            working_directory: Referable::new(String::new(), start.clone()),
            allow: DocumentAllow {
                dep_on_any_vendor: Referable::new(false, start.clone()),
                deep_scan: Referable::new(false, start),
            },
            exclude: Vec::new(),
            exclude_files: Vec::new(),
            common_components: Vec::new(),
            common_vendors: Vec::new(),
            vendors: Vec::new(),
            components: Vec::new(),
            path,
        }
    }

    /// Returns the document file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the declared schema version.
    #[must_use]
    pub fn version(&self) -> &Referable<i64> {
        &self.version
    }

    /// Returns the working directory, relative to the project root.
    #[must_use]
    pub fn working_directory(&self) -> &Referable<String> {
        &self.working_directory
    }

    /// Returns the global allow flags.
    #[must_use]
    pub fn allow(&self) -> &DocumentAllow {
        &self.allow
    }

    /// Returns the excluded directory globs.
    #[must_use]
    pub fn exclude(&self) -> &[Referable<String>] {
        &self.exclude
    }

    /// Returns the excluded file regexes.
    #[must_use]
    pub fn exclude_files(&self) -> &[Referable<String>] {
        &self.exclude_files
    }

    /// Returns the common components.
    #[must_use]
    pub fn common_components(&self) -> &[Referable<String>] {
        &self.common_components
    }

    /// Returns the common vendors.
    #[must_use]
    pub fn common_vendors(&self) -> &[Referable<String>] {
        &self.common_vendors
    }

    /// Returns all vendor declarations, in document order.
    #[must_use]
    pub fn vendors(&self) -> &[DocumentVendor] {
        &self.vendors
    }

    /// Returns all component declarations, in document order.
    #[must_use]
    pub fn components(&self) -> &[DocumentComponent] {
        &self.components
    }

    /// Gets the first vendor declared under `name`.
    #[must_use]
    pub fn vendor(&self, name: &str) -> Option<&DocumentVendor> {
        self.vendors.iter().find(|v| v.name.value == name)
    }

    /// Gets the first component declared under `name`.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&DocumentComponent> {
        self.components.iter().find(|c| c.name.value == name)
    }
}
