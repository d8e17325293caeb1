//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization. Every scalar is
//! wrapped in [`Spanned`] so the decoder can point notices back at the
//! document text; tables are located through their `name` span. They are
//! converted to [`Document`](super::document::Document) by the decoder.

use serde::Deserialize;
use toml::Spanned;

/// Raw TOML representation of an architecture document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct DocumentDto {
    /// Schema version.
    pub version: Spanned<i64>,

    /// Working directory, relative to the project root.
    #[serde(default)]
    pub workdir: Option<Spanned<String>>,

    /// Global allow flags.
    #[serde(default)]
    pub allow: Option<AllowDto>,

    /// Excluded directory globs, relative to the working directory.
    #[serde(default)]
    pub exclude: Vec<Spanned<String>>,

    /// Excluded file regexes.
    #[serde(default)]
    pub exclude_files: Vec<Spanned<String>>,

    /// Components every component may depend on.
    #[serde(default)]
    pub common_components: Vec<Spanned<String>>,

    /// Vendors every component may use.
    #[serde(default)]
    pub common_vendors: Vec<Spanned<String>>,

    /// Vendor declarations.
    #[serde(default)]
    pub vendors: Vec<VendorDto>,

    /// Component declarations.
    #[serde(default)]
    pub components: Vec<ComponentDto>,
}

/// TOML representation of `[allow]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct AllowDto {
    /// Allow any vendor import from any component.
    #[serde(default)]
    pub dep_on_any_vendor: Option<Spanned<bool>>,

    /// Enable the deep scan (schema version 3+).
    #[serde(default)]
    pub deep_scan: Option<Spanned<bool>>,
}

/// TOML representation of a `[[vendors]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VendorDto {
    /// Vendor name (e.g., "log").
    pub name: Spanned<String>,
    /// Import-path globs belonging to this vendor.
    #[serde(rename = "in")]
    pub import_paths: Vec<Spanned<String>>,
}

/// TOML representation of a `[[components]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ComponentDto {
    /// Component name (e.g., "repository").
    pub name: Spanned<String>,

    /// Directory globs, relative to the working directory.
    #[serde(rename = "in")]
    pub paths: Vec<Spanned<String>>,

    /// Components this one may import.
    #[serde(default)]
    pub may_depend_on: Vec<Spanned<String>>,

    /// Vendors this one may import.
    #[serde(default)]
    pub can_use: Vec<Spanned<String>>,

    /// Allow importing any project package.
    #[serde(default)]
    pub any_project_deps: Option<Spanned<bool>>,

    /// Allow importing any vendor package.
    #[serde(default)]
    pub any_vendor_deps: Option<Spanned<bool>>,

    /// Per-component deep scan override (schema version 3+).
    #[serde(default)]
    pub deep_scan: Option<Spanned<bool>>,
}
