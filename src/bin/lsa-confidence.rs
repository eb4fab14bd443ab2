//! Confidence propagation gate binary.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use lsa_gate::cli::{self, EXIT_OK, EXIT_USAGE, EXIT_VIOLATIONS};
use lsa_gate::confidence;
use lsa_gate::{GateResult, ReferenceGraph};

/// Check confidence propagation bounds over an LSA artifact.
#[derive(Debug, Parser)]
#[command(name = "lsa-confidence")]
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
    println!("Validating LSA confidence: {}", args.artifact.display());
    let graph = ReferenceGraph::build(&artifact);
    let violations = confidence::validate(&artifact, &graph);
    if violations.is_empty() {
        println!("OK: all confidence scores within propagation bounds");
        return Ok(EXIT_OK);
    }
    println!("Confidence violations ({}):", violations.len());
    for (i, violation) in violations.iter().enumerate() {
        println!("  {}. {}", i + 1, violation);
    }
    Ok(EXIT_VIOLATIONS)
}
