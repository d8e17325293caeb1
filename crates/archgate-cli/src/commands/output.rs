//! Output formatting for check, mapping and self-inspect results.

use anyhow::Result;
use archgate_core::{CheckOutput, MappingOutput, Notice, Reference, SelfInspection, Verdict};
use serde::Serialize;

use crate::{MappingScheme, OutputFormat};

/// Print check output in the specified format.
pub fn print(output: &CheckOutput, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(output),
        OutputFormat::Json => return print_json(output),
        OutputFormat::Compact => print_compact(output),
    }
    Ok(())
}

fn print_text(output: &CheckOutput) {
    if print_notices(&output.document_notices) {
        println!("\x1b[31mDependencies were not checked\x1b[0m");
        return;
    }

    let warnings = &output.warnings;
    for w in &warnings.dependency_warnings {
        println!("{}", w.reference);
        println!(
            "  \x1b[33mwarning\x1b[0m: component {} shouldn't depend on {}",
            w.component_name, w.resolved_import_name
        );
        print_preview(&w.reference);
        println!();
    }
    for w in &warnings.match_warnings {
        println!("{}", w.file_relative_path.display());
        println!("  \x1b[33mwarning\x1b[0m: file is not attached to any component");
        println!();
    }
    for w in &warnings.deepscan_warnings {
        println!("{}", w.reference);
        println!(
            "  \x1b[33mwarning\x1b[0m: {} is injected into {}, but component {} shouldn't depend on it",
            w.dependency_name, w.gate_method, w.gate_component
        );
        println!("  = note: {} is defined at {}", w.gate_method, w.gate_definition);
        print_preview(&w.reference);
        println!();
    }

    match output.verdict() {
        Verdict::Passed => println!("\x1b[32mOK: {} has no warnings\x1b[0m", output.module_name),
        Verdict::Failed => {
            print!(
                "\x1b[33mFound {} warning(s) in {}",
                output.total_warnings(),
                output.module_name
            );
            if output.omitted_count > 0 {
                print!(" ({} not shown)", output.omitted_count);
            }
            println!("\x1b[0m");
        }
    }
}

/// Prints the lines around `reference`, marking the referenced one.
fn print_preview(reference: &Reference) {
    if !reference.is_valid() {
        return;
    }
    let Ok(content) = std::fs::read_to_string(&reference.file) else {
        return;
    };
    let range = reference.extend_range(1, 1);
    for (idx, text) in content.lines().enumerate() {
        let line = idx + 1;
        if !range.contains(line) {
            continue;
        }
        let marker = if line == range.line { ">" } else { " " };
        println!("  {marker} {line:>4} | {text}");
    }
}

/// Prints document notices; returns false if there are none.
fn print_notices(notices: &[Notice]) -> bool {
    if notices.is_empty() {
        return false;
    }
    println!("\x1b[31mThe spec document has problems:\x1b[0m\n");
    for notice in notices {
        println!("{}", notice.reference);
        println!("  \x1b[31merror\x1b[0m: {}", notice.message);
        print_preview(&notice.reference);
        println!();
    }
    println!(
        "\x1b[31mFound {} problem(s) in the spec document\x1b[0m",
        notices.len()
    );
    true
}

fn print_json<T: Serialize>(output: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(output)?;
    println!("{json}");
    Ok(())
}

fn print_compact(output: &CheckOutput) {
    for notice in &output.document_notices {
        println!("{}: error [spec] {}", notice.reference, notice.message);
    }
    let warnings = &output.warnings;
    for w in &warnings.dependency_warnings {
        println!(
            "{}: warning [imports] {} -> {}",
            w.reference, w.component_name, w.resolved_import_name
        );
    }
    for w in &warnings.match_warnings {
        println!(
            "{}: warning [imports] not attached to any component",
            w.file_relative_path.display()
        );
    }
    for w in &warnings.deepscan_warnings {
        println!(
            "{}: warning [deepscan] {} -> {} via {}",
            w.reference, w.gate_component, w.dependency_name, w.gate_method
        );
    }
}

/// Print a file mapping in the specified scheme and format.
pub fn print_mapping(
    output: &MappingOutput,
    scheme: MappingScheme,
    format: OutputFormat,
) -> Result<()> {
    if matches!(format, OutputFormat::Json) {
        return print_json(output);
    }
    if print_notices(&output.document_notices) {
        return Ok(());
    }

    match (scheme, format) {
        (MappingScheme::List, OutputFormat::Text) => {
            for m in &output.list {
                let component = m
                    .component_name
                    .as_deref()
                    .unwrap_or("\x1b[33m[not attached]\x1b[0m");
                println!("{} \u{2192} {component}", m.file_relative_path.display());
            }
        }
        (MappingScheme::Grouped, OutputFormat::Text) => {
            for group in &output.grouped {
                println!("\x1b[1m{}\x1b[0m", group.component_name);
                for file in &group.files {
                    println!("  {}", file.display());
                }
            }
            if !output.unmatched.is_empty() {
                println!("\x1b[33m[not attached]\x1b[0m");
                for file in &output.unmatched {
                    println!("  {}", file.display());
                }
            }
        }
        _ => {
            for m in &output.list {
                println!(
                    "{}:{}",
                    m.file_relative_path.display(),
                    m.component_name.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

/// Print the inspected spec in the specified format.
pub fn print_inspection(inspection: &SelfInspection, format: OutputFormat) -> Result<()> {
    if matches!(format, OutputFormat::Json) {
        return print_json(inspection);
    }
    if print_notices(&inspection.document_notices) {
        return Ok(());
    }

    println!("module:  {}", inspection.module_name);
    println!("root:    {}", inspection.root_directory.display());
    println!("spec:    {}", inspection.spec_path.display());
    println!("workdir: {}", inspection.working_directory);
    println!("exclude: {}", inspection.exclude.join(", "));
    println!("exclude-files: {}", inspection.exclude_files.join(", "));
    println!("dep-on-any-vendor: {}", inspection.dep_on_any_vendor);
    println!("deep-scan: {}", inspection.deep_scan);

    for c in &inspection.components {
        println!("\n\x1b[1m{}\x1b[0m", c.name);
        println!("  packages:      {}", c.packages.join(", "));
        println!("  may-depend-on: {}", c.may_depend_on.join(", "));
        println!("  can-use:       {}", c.can_use.join(", "));
        println!("  project deps:  {}", c.allowed_project_imports.join(", "));
        println!("  vendor deps:   {}", c.allowed_vendor_globs.join(", "));
        if c.allow_all_project_deps {
            println!("  = any project dependency allowed");
        }
        if c.allow_all_vendor_deps {
            println!("  = any vendor dependency allowed");
        }
        println!("  deep-scan:     {}", c.deep_scan);
    }
    Ok(())
}
