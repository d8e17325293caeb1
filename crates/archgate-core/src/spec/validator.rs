//! Structural validation of a decoded [`Document`].
//!
//! Rules are independent and run in a fixed order; every rule runs even if
//! an earlier one reported something.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use super::document::Document;
use super::schema;
use crate::resolver::{local_glob, Resolver};
use crate::types::{Notice, Referable};

/// What a rule may look at besides the document.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    resolver: &'a Resolver,
}

impl<'a> ValidationContext<'a> {
    /// Creates a context for the project served by `resolver`.
    #[must_use]
    pub fn new(resolver: &'a Resolver) -> Self {
        Self { resolver }
    }

    /// Returns the resolver.
    #[must_use]
    pub fn resolver(&self) -> &'a Resolver {
        self.resolver
    }

    /// Returns the project root directory.
    #[must_use]
    pub fn project_dir(&self) -> &'a Path {
        self.resolver.root_directory()
    }
}

/// One structural check over a document.
pub trait ValidationRule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "components").
    fn name(&self) -> &'static str;

    /// Returns every problem found; empty if the document passes.
    fn validate(&self, document: &Document, ctx: &ValidationContext<'_>) -> Vec<Notice>;
}

/// Runs the standard rule list.
pub struct Validator<'a> {
    ctx: ValidationContext<'a>,
    rules: Vec<Box<dyn ValidationRule>>,
}

impl<'a> Validator<'a> {
    /// Creates a validator with the standard rules.
    #[must_use]
    pub fn new(ctx: ValidationContext<'a>) -> Self {
        Self {
            ctx,
            rules: vec![
                Box::new(CommonComponentsRule),
                Box::new(CommonVendorsRule),
                Box::new(ComponentsRule),
                Box::new(DepsRule),
                Box::new(DepsVendorsRule),
                Box::new(ExcludeFilesRule),
                Box::new(VendorsRule),
                Box::new(VersionRule),
                Box::new(WorkDirRule),
            ],
        }
    }

    /// Returns the names of the rules, in execution order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Runs every rule and concatenates their notices in rule order.
    #[must_use]
    pub fn validate(&self, document: &Document) -> Vec<Notice> {
        let mut notices = Vec::new();
        for rule in &self.rules {
            let found = rule.validate(document, &self.ctx);
            debug!("Validation rule '{}': {} notice(s)", rule.name(), found.len());
            notices.extend(found);
        }
        notices
    }
}

impl std::fmt::Debug for Validator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("ctx", &self.ctx)
            .field("rules", &self.rule_names())
            .finish()
    }
}

/// `common-components` entries must name declared components.
#[derive(Debug, Clone, Copy)]
pub struct CommonComponentsRule;

impl ValidationRule for CommonComponentsRule {
    fn name(&self) -> &'static str {
        "common-components"
    }

    fn validate(&self, document: &Document, _ctx: &ValidationContext<'_>) -> Vec<Notice> {
        document
            .common_components()
            .iter()
            .filter(|name| document.component(&name.value).is_none())
            .map(|name| {
                Notice::new(
                    format!("common component '{}' is not defined", name.value),
                    name.reference.clone(),
                )
            })
            .collect()
    }
}

/// `common-vendors` entries must name declared vendors.
#[derive(Debug, Clone, Copy)]
pub struct CommonVendorsRule;

impl ValidationRule for CommonVendorsRule {
    fn name(&self) -> &'static str {
        "common-vendors"
    }

    fn validate(&self, document: &Document, _ctx: &ValidationContext<'_>) -> Vec<Notice> {
        document
            .common_vendors()
            .iter()
            .filter(|name| document.vendor(&name.value).is_none())
            .map(|name| {
                Notice::new(
                    format!("common vendor '{}' is not defined", name.value),
                    name.reference.clone(),
                )
            })
            .collect()
    }
}

/// Component declarations: unique non-empty names, resolvable directories.
#[derive(Debug, Clone, Copy)]
pub struct ComponentsRule;

impl ValidationRule for ComponentsRule {
    fn name(&self) -> &'static str {
        "components"
    }

    fn validate(&self, document: &Document, ctx: &ValidationContext<'_>) -> Vec<Notice> {
        let mut notices = Vec::new();
        let mut seen = HashSet::new();
        let workdir = &document.working_directory().value;

        for component in document.components() {
            let name = component.name();
            if name.value.is_empty() {
                notices.push(Notice::new(
                    "component name should not be empty",
                    name.reference.clone(),
                ));
            } else if !seen.insert(name.value.as_str()) {
                notices.push(Notice::new(
                    format!("component '{}' is already defined", name.value),
                    name.reference.clone(),
                ));
            }

            if component.paths().is_empty() {
                notices.push(Notice::new(
                    format!(
                        "component '{}' should have at least one directory in 'in'",
                        name.value
                    ),
                    name.reference.clone(),
                ));
            }

            for path in component.paths() {
                let glob = local_glob(workdir, &path.value);
                match ctx.resolver().resolve_local_glob(&glob) {
                    Ok(found) if found.is_empty() => notices.push(Notice::new(
                        format!(
                            "directory '{}' of component '{}' does not match any directory",
                            path.value, name.value
                        ),
                        path.reference.clone(),
                    )),
                    Ok(_) => {}
                    Err(err) => notices.push(Notice::new(
                        format!(
                            "directory '{}' of component '{}' cannot be resolved: {err}",
                            path.value, name.value
                        ),
                        path.reference.clone(),
                    )),
                }
            }

            let references = [
                ("may-depend-on", component.may_depend_on()),
                ("can-use", component.can_use()),
            ];
            for (key, targets) in references {
                for target in targets.iter().filter(|t| t.value.is_empty()) {
                    notices.push(Notice::new(
                        format!("component '{}' has an empty name in '{key}'", name.value),
                        target.reference.clone(),
                    ));
                }
            }
        }

        notices
    }
}

/// `may-depend-on` targets must exist and be listed once.
#[derive(Debug, Clone, Copy)]
pub struct DepsRule;

impl ValidationRule for DepsRule {
    fn name(&self) -> &'static str {
        "deps"
    }

    fn validate(&self, document: &Document, _ctx: &ValidationContext<'_>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for component in document.components() {
            let owner = &component.name().value;
            check_targets(component.may_depend_on(), &mut notices, |target| {
                if target.value.is_empty() || document.component(&target.value).is_some() {
                    None
                } else {
                    Some(format!(
                        "component '{owner}' depends on unknown component '{}'",
                        target.value
                    ))
                }
            });
            notices.extend(duplicates(component.may_depend_on(), |target| {
                format!(
                    "component '{owner}' lists dependency '{}' more than once",
                    target.value
                )
            }));
        }
        notices
    }
}

/// `can-use` targets must exist and be listed once.
#[derive(Debug, Clone, Copy)]
pub struct DepsVendorsRule;

impl ValidationRule for DepsVendorsRule {
    fn name(&self) -> &'static str {
        "deps-vendors"
    }

    fn validate(&self, document: &Document, _ctx: &ValidationContext<'_>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for component in document.components() {
            let owner = &component.name().value;
            check_targets(component.can_use(), &mut notices, |target| {
                if target.value.is_empty() || document.vendor(&target.value).is_some() {
                    None
                } else {
                    Some(format!(
                        "component '{owner}' uses unknown vendor '{}'",
                        target.value
                    ))
                }
            });
            notices.extend(duplicates(component.can_use(), |target| {
                format!(
                    "component '{owner}' lists vendor '{}' more than once",
                    target.value
                )
            }));
        }
        notices
    }
}

/// `exclude-files` regexes must compile.
#[derive(Debug, Clone, Copy)]
pub struct ExcludeFilesRule;

impl ValidationRule for ExcludeFilesRule {
    fn name(&self) -> &'static str {
        "exclude-files"
    }

    fn validate(&self, document: &Document, _ctx: &ValidationContext<'_>) -> Vec<Notice> {
        document
            .exclude_files()
            .iter()
            .filter_map(|pattern| {
                regex::Regex::new(&pattern.value).err().map(|err| {
                    Notice::new(
                        format!(
                            "exclude-files regex '{}' is invalid: {}",
                            pattern.value,
                            first_line(&err.to_string())
                        ),
                        pattern.reference.clone(),
                    )
                })
            })
            .collect()
    }
}

/// Vendor declarations: unique names, at least one import path.
#[derive(Debug, Clone, Copy)]
pub struct VendorsRule;

impl ValidationRule for VendorsRule {
    fn name(&self) -> &'static str {
        "vendors"
    }

    fn validate(&self, document: &Document, _ctx: &ValidationContext<'_>) -> Vec<Notice> {
        let mut notices = Vec::new();
        let mut seen = HashSet::new();
        for vendor in document.vendors() {
            let name = vendor.name();
            if !seen.insert(name.value.as_str()) {
                notices.push(Notice::new(
                    format!("vendor '{}' is already defined", name.value),
                    name.reference.clone(),
                ));
            }
            if vendor.import_paths().is_empty() {
                notices.push(Notice::new(
                    format!(
                        "vendor '{}' should have at least one import path in 'in'",
                        name.value
                    ),
                    name.reference.clone(),
                ));
            }
        }
        notices
    }
}

/// The document version must be supported.
#[derive(Debug, Clone, Copy)]
pub struct VersionRule;

impl ValidationRule for VersionRule {
    fn name(&self) -> &'static str {
        "version"
    }

    fn validate(&self, document: &Document, _ctx: &ValidationContext<'_>) -> Vec<Notice> {
        let version = document.version();
        if schema::is_supported(version.value) {
            return Vec::new();
        }
        let supported: Vec<String> = schema::SUPPORTED_VERSIONS
            .iter()
            .map(ToString::to_string)
            .collect();
        vec![Notice::new(
            format!(
                "version {} is not supported, expected one of: {}",
                version.value,
                supported.join(", ")
            ),
            version.reference.clone(),
        )]
    }
}

/// The working directory must exist inside the project.
#[derive(Debug, Clone, Copy)]
pub struct WorkDirRule;

impl ValidationRule for WorkDirRule {
    fn name(&self) -> &'static str {
        "workdir"
    }

    fn validate(&self, document: &Document, ctx: &ValidationContext<'_>) -> Vec<Notice> {
        let workdir = document.working_directory();
        let path = ctx.project_dir().join(&workdir.value);
        if path.is_dir() {
            Vec::new()
        } else {
            vec![Notice::new(
                format!("workdir '{}' is not a directory", workdir.value),
                workdir.reference.clone(),
            )]
        }
    }
}

fn check_targets(
    targets: &[Referable<String>],
    notices: &mut Vec<Notice>,
    message: impl Fn(&Referable<String>) -> Option<String>,
) {
    for target in targets {
        if let Some(text) = message(target) {
            notices.push(Notice::new(text, target.reference.clone()));
        }
    }
}

fn duplicates(
    targets: &[Referable<String>],
    message: impl Fn(&Referable<String>) -> String,
) -> Vec<Notice> {
    let mut seen = HashSet::new();
    targets
        .iter()
        .filter(|t| !t.value.is_empty() && !seen.insert(t.value.as_str()))
        .map(|t| Notice::new(message(t), t.reference.clone()))
        .collect()
}

fn first_line(message: &str) -> &str {
    message
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or(message)
}
