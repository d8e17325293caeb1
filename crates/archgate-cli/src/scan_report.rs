//! Scan report: the classified project files produced by an external scanner.
//!
//! ```json
//! {
//!   "module": "example.com/prj",
//!   "files": [
//!     {
//!       "file": {
//!         "path": "internal/app/app.go",
//!         "imports": [
//!           { "name": "fmt", "import_type": "stdlib",
//!             "reference": { "file": "internal/app/app.go", "line": 3, "column": 2 } }
//!         ]
//!       },
//!       "component_id": "app"
//!     }
//!   ]
//! }
//! ```
//!
//! Relative paths are taken relative to the project root.

use anyhow::{Context, Result};
use archgate_core::{FileHold, Reference};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// Classified files of one project.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanReport {
    /// Module name of the project.
    pub module: String,
    /// Files with their owning component.
    #[serde(default)]
    pub files: Vec<FileHold>,
}

impl ScanReport {
    /// Reads a report from `path`, or from stdin when `path` is `-`.
    pub fn read(path: &Path) -> Result<Self> {
        let content = if path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read scan report from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read scan report: {}", path.display()))?
        };
        Self::parse(&content)
    }

    /// Parses a JSON report.
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid scan report")
    }

    /// Returns the files with every path made absolute against `root`.
    #[must_use]
    pub fn into_holds(self, root: &Path) -> Vec<FileHold> {
        self.files
            .into_iter()
            .map(|mut hold| {
                let file = &mut hold.file;
                file.path = root.join(&file.path);
                for import in &mut file.imports {
                    absolutize(&mut import.reference, root);
                }
                for injection in &mut file.injections {
                    absolutize(&mut injection.gate.definition, root);
                    absolutize(&mut injection.dependency.reference, root);
                }
                hold
            })
            .collect()
    }
}

fn absolutize(reference: &mut Reference, root: &Path) {
    if !reference.file.as_os_str().is_empty() {
        reference.file = root.join(&reference.file);
    }
}
