//! Structural integrity gate binary.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use lsa_gate::cli::{self, EXIT_OK, EXIT_USAGE, EXIT_VIOLATIONS};
use lsa_gate::structure;
use lsa_gate::{GateResult, ReferenceGraph};

/// Check reference integrity of an LSA artifact: support cycles,
/// dangling ids, orphaned and unacknowledged entities.
#[derive(Debug, Parser)]
#[command(name = "lsa-structure")]
#[command(version, about, long_about = None)]
struct Args {
    /// Artifact JSON file to validate
    artifact: PathBuf,
}

fn main() {
    let args = Args::parse();
    match run(&args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_USAGE);
        }
    }
}

fn run(args: &Args) -> GateResult<i32> {
    let artifact = cli::read_shaped(&args.artifact)?;
    println!("Validating LSA structure: {}", args.artifact.display());
    let graph = ReferenceGraph::build(&artifact);
    let report = structure::validate(&artifact, &graph);
    if !report.errors.is_empty() {
        println!("ERRORS:");
        for error in &report.errors {
            println!("  - {}", error);
        }
    }
    if !report.warnings.is_empty() {
        println!("WARNINGS:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }
    if report.passed() {
        println!("OK: structure is valid");
        Ok(EXIT_OK)
    } else {
        println!("FAIL: {} structural error(s)", report.errors.len());
        Ok(EXIT_VIOLATIONS)
    }
}
