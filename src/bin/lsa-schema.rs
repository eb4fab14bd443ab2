//! Schema conformance gate binary.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use lsa_gate::cli::{self, EXIT_OK, EXIT_USAGE, EXIT_VIOLATIONS};
use lsa_gate::schema;
use lsa_gate::GateResult;

/// Validate an LSA artifact against the schema rules.
#[derive(Debug, Parser)]
#[command(name = "lsa-schema")]
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
    let document = cli::read_artifact(&args.artifact)?;
    println!("Validating LSA schema: {}", args.artifact.display());
    let violations = schema::validate(&document);
    if violations.is_empty() {
        println!("OK: artifact conforms to the LSA schema");
        return Ok(EXIT_OK);
    }
    println!("Schema violations ({}):", violations.len());
    for (i, violation) in violations.iter().enumerate() {
        println!("  {}. {}", i + 1, violation);
    }
    Ok(EXIT_VIOLATIONS)
}
