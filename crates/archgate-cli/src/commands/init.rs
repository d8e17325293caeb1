//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_SPEC: &str = r#"# archgate spec
version = 3

# Directory the component globs are relative to
workdir = "internal"

# Directories skipped entirely
exclude = []

# Regexes over absolute file paths
exclude-files = ["_test\\.go$"]

# Components every component may import
common-components = []

# Vendors every component may use
common-vendors = []

[allow]
# Skip vendor checks altogether
dep-on-any-vendor = false
# Check dependencies passed into injection methods
deep-scan = true

# [[vendors]]
# name = "log"
# in = ["github.com/sirupsen/logrus"]

[[components]]
name = "domain"
in = ["domain/**"]

[[components]]
name = "app"
in = ["app/**"]
may-depend-on = ["domain"]
# can-use = ["log"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let spec_path = Path::new("archgate.toml");

    if spec_path.exists() && !force {
        bail!(
            "Spec already exists at {}. Use --force to overwrite.",
            spec_path.display()
        );
    }

    std::fs::write(spec_path, DEFAULT_SPEC)?;

    println!("Created archgate.toml");
    println!("\nNext steps:");
    println!("  1. Describe your components in archgate.toml");
    println!("  2. Run: archgate check --files scan.json");

    Ok(())
}
