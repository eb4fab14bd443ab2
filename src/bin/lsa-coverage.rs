//! Contradiction coverage gate binary.

use std::path::Path;
use std::process;

use clap::Parser;

use lsa_gate::cli::{self, EXIT_OK, EXIT_USAGE, EXIT_VIOLATIONS};
use lsa_gate::coverage::{self, CoverageReport, DEFAULT_THRESHOLD};
use lsa_gate::GateResult;

const MAX_EXEMPTION_LINES: usize = 5;
const MAX_UNCHECKED_LINES: usize = 10;

/// Compute contradiction coverage for one or more LSA artifacts.
#[derive(Debug, Parser)]
#[command(name = "lsa-coverage")]
#[command(version, about, long_about = None)]
struct Args {
    /// Minimum acceptable coverage ratio
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Artifact files or glob patterns
    #[arg(required = true)]
    artifacts: Vec<String>,
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
    let threshold = cli::check_threshold(args.threshold)?;
    let paths = cli::expand_inputs(&args.artifacts)?;
    let mut all_pass = true;
    for path in &paths {
        let artifact = cli::read_shaped(path)?;
        let report = coverage::compute(&artifact);
        print_report(path, &report, threshold);
        if !report.meets(threshold) {
            all_pass = false;
        }
    }
    if all_pass {
        println!("All files meet the contradiction coverage threshold");
        Ok(EXIT_OK)
    } else {
        println!("Some files fall below the contradiction coverage threshold");
        Ok(EXIT_VIOLATIONS)
    }
}

fn print_report(path: &Path, report: &CoverageReport, threshold: f64) {
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("Contradiction Coverage Report");
    println!("{}", rule);
    println!("File: {}", path.display());
    println!("Total claims: {}", report.total_claims);
    println!("Exempt claims: {}", report.exempt_claims);
    println!("Checkable claims: {}", report.checkable_claims);
    println!("Checked claims: {}", report.checked_claims);
    println!("Unchecked claims: {}", report.unchecked_claims);
    println!("Coverage: {:.1}%", report.coverage * 100.0);
    println!("Threshold: {:.1}%", threshold * 100.0);
    println!("{}", rule);
    if report.meets(threshold) {
        println!("PASS - meets coverage threshold");
    } else {
        println!("FAIL - below coverage threshold");
    }
    if !report.exemptions.is_empty() {
        println!("Exemptions ({}):", report.exemptions.len());
        for exemption in report.exemptions.iter().take(MAX_EXEMPTION_LINES) {
            println!("  - {}: {}", exemption.id, exemption.reason);
        }
        if report.exemptions.len() > MAX_EXEMPTION_LINES {
            println!("  ... and {} more", report.exemptions.len() - MAX_EXEMPTION_LINES);
        }
    }
    if !report.unchecked_ids.is_empty() {
        println!("Unchecked claims ({}):", report.unchecked_ids.len());
        for id in report.unchecked_ids.iter().take(MAX_UNCHECKED_LINES) {
            println!("  - {}", id);
        }
        if report.unchecked_ids.len() > MAX_UNCHECKED_LINES {
            println!("  ... and {} more", report.unchecked_ids.len() - MAX_UNCHECKED_LINES);
        }
    }
}
