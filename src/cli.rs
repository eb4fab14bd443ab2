//! Shared plumbing for the gate binaries.

use std::fs;
use std::path::{Path, PathBuf};

use globset::Glob;
use serde_json::Value;

use crate::error::{GateError, GateResult};
use crate::types::Artifact;

/// Exit code for a clean run.
pub const EXIT_OK: i32 = 0;
/// Exit code when a gate found hard errors.
pub const EXIT_VIOLATIONS: i32 = 1;
/// Exit code for operational failures: bad arguments, unreadable input.
pub const EXIT_USAGE: i32 = 2;

/// Read and parse one artifact file.
pub fn read_artifact(path: &Path) -> GateResult<Value> {
    let text = fs::read_to_string(path).map_err(|e| GateError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| GateError::Json {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read, parse, and shape one artifact file into the typed model.
pub fn read_shaped(path: &Path) -> GateResult<Artifact> {
    let document = read_artifact(path)?;
    Artifact::from_value(&document)
}

/// Validate a coverage threshold argument.
pub fn check_threshold(value: f64) -> GateResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(GateError::InvalidThreshold { value })
    }
}

/// Expand mixed path and glob arguments into a concrete file list.
///
/// Glob syntax applies to the final path component and matches against
/// the parent directory; non-glob arguments pass through untouched. A
/// pattern matching nothing is an error; matches come back sorted for
/// stable processing order.
pub fn expand_inputs(args: &[String]) -> GateResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for arg in args {
        if is_glob(arg) {
            paths.extend(expand_glob(arg)?);
        } else {
            paths.push(PathBuf::from(arg));
        }
    }
    Ok(paths)
}

fn is_glob(arg: &str) -> bool {
    arg.chars().any(|c| matches!(c, '*' | '?' | '['))
}

fn expand_glob(pattern: &str) -> GateResult<Vec<PathBuf>> {
    let full = Path::new(pattern);
    let dir = match full.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_pattern = full
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| GateError::BadGlob {
            pattern: pattern.to_string(),
            message: "pattern has no file component".to_string(),
        })?;
    let matcher = Glob::new(file_pattern)
        .map_err(|e| GateError::BadGlob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?
        .compile_matcher();

    let entries = fs::read_dir(dir).map_err(|e| GateError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;
    let mut matched = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| GateError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if matcher.is_match(name) {
                matched.push(path);
            }
        }
    }
    if matched.is_empty() {
        return Err(GateError::EmptyGlob {
            pattern: pattern.to_string(),
        });
    }
    matched.sort();
    Ok(matched)
}
