//! List checks command implementation.

use archgate_core::spec::validator::{ValidationContext, Validator};
use archgate_core::{CompositeChecker, Resolver};

/// Runs the list-checks command.
pub fn run() {
    println!("Checks (in execution order):\n");
    for name in CompositeChecker::standard().checker_names() {
        println!("  {name}");
    }

    let resolver = Resolver::with_glob(".", "");
    let validator = Validator::new(ValidationContext::new(&resolver));
    println!("\nSpec validation rules:\n");
    for name in validator.rule_names() {
        println!("  {name}");
    }

    println!("\nA check stops the run once it reports warnings; later checks are skipped.");
}
