//! # archgate-core
//!
//! Core engine for checking a project's import graph against a declared
//! architecture.
//!
//! This crate provides:
//!
//! - [`spec`] for decoding, validating and assembling the architecture spec
//! - [`Resolver`] for expanding directory globs into import paths
//! - [`Checker`] implementations for direct imports and the deep scan
//! - [`CheckOperation`] wiring the pipeline together, plus
//!   [`MappingOperation`] and [`SelfInspectOperation`] for inspecting how
//!   files and the spec resolve
//!
//! Source files are not scanned here: the caller supplies already
//! classified [`FileHold`]s through a [`ProjectFilesProvider`].
//!
//! ## Example
//!
//! ```ignore
//! use archgate_core::{CheckContext, CheckInput, CheckOperation, MaxWarnings, ProjectInfo};
//!
//! let operation = CheckOperation::new(Box::new(scanner));
//! let input = CheckInput {
//!     project: ProjectInfo::new(".", "example.com/prj", "archgate.toml"),
//!     max_warnings: MaxWarnings::default(),
//! };
//! let output = operation.run(&CheckContext::new(), &input)?;
//! println!("{:?}", output.verdict());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod checker;
pub mod operation;
pub mod resolver;
pub mod result;
pub mod spec;
mod types;

#[cfg(test)]
mod testing;

pub use checker::{
    CheckContext, CheckError, Checker, CheckerBox, CompositeChecker, DeepScanChecker,
    ImportsChecker,
};
pub use operation::{
    BoxError, CheckInput, CheckOperation, CheckOutput, CheckQuality, ComponentFiles,
    ComponentSummary, FileMapping, MappingOperation, MappingOutput, MaxWarnings,
    MaxWarningsError, OperationError, ProjectFilesProvider, SelfInspectOperation,
    SelfInspection, Verdict,
};
pub use resolver::{GlobPathResolver, PathResolver, ResolveError, Resolver};
pub use result::{
    limit, CheckResult, DeepScanWarning, DependencyWarning, LimitedResult, MatchWarning,
};
pub use spec::{load, Component, ProjectInfo, Spec, SpecError};
pub use types::{
    FileHold, Glob, ImportType, Injection, InjectionGate, Notice, ProjectFile, Referable,
    Reference, ResolvedImport, ResolvedPath, SourceRange,
};
