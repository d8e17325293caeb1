//! Deep scan: dependencies passed into injection gates.
//!
//! A component that only imports abstractions may still receive concrete
//! implementations through methods like `SetStore(s Store)`. The deep scan
//! checks each injected dependency against the allow-lists of the component
//! that owns the gate method.

use tracing::debug;

use super::imports::is_allowed;
use super::{CheckContext, CheckError, Checker};
use crate::result::{CheckResult, DeepScanWarning};
use crate::spec::Spec;
use crate::types::FileHold;

/// Checks injections against the gate component's rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepScanChecker;

impl Checker for DeepScanChecker {
    fn name(&self) -> &'static str {
        "deepscan"
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
            if file.injections.is_empty() {
                continue;
            }
            let relative = file.relative_path(&spec.root_directory);

            for injection in &file.injections {
                let Some(gate_component) =
                    spec.component_for_import_path(&injection.gate.import_path)
                else {
                    debug!(
                        "Gate {} in {} belongs to no component",
                        injection.gate.method, injection.gate.import_path
                    );
                    continue;
                };
                if !gate_component.deep_scan.value {
                    continue;
                }
                if is_allowed(spec, gate_component, &injection.dependency)? {
                    continue;
                }

                result.deepscan_warnings.push(DeepScanWarning {
                    gate_component: gate_component.name.value.clone(),
                    gate_method: injection.gate.method.clone(),
                    gate_definition: injection.gate.definition.clone(),
                    dependency_name: injection.dependency.name.clone(),
                    file_relative_path: relative.clone(),
                    file_absolute_path: file.path.clone(),
                    reference: injection.dependency.reference.clone(),
                });
            }
        }

        result.sort();
        Ok(result)
    }
}
