//! Error types for the gate toolchain.
//!
//! These are operational failures: unreadable files, malformed JSON,
//! unusable CLI arguments. Defects found *inside* a well-formed artifact
//! are not errors in this sense; the validators report those as
//! diagnostic values and never return `Err` for them.

use std::fmt;

/// Unified error type for gate operations.
#[derive(Debug, Clone)]
pub enum GateError {
    /// File could not be read
    Io { path: String, message: String },
    /// File is not valid JSON
    Json { path: String, message: String },
    /// Document cannot be shaped into the typed artifact model
    Shape { message: String },
    /// Coverage threshold outside the accepted range
    InvalidThreshold { value: f64 },
    /// Glob pattern could not be compiled
    BadGlob { pattern: String, message: String },
    /// Glob pattern matched no files
    EmptyGlob { pattern: String },
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "cannot read '{}': {}", path, message)
            }
            Self::Json { path, message } => {
                write!(f, "invalid JSON in '{}': {}", path, message)
            }
            Self::Shape { message } => {
                write!(f, "document does not shape into an LSA artifact: {}", message)
            }
            Self::InvalidThreshold { value } => {
                write!(f, "threshold must be between 0 and 1, got {}", value)
            }
            Self::BadGlob { pattern, message } => {
                write!(f, "invalid glob pattern '{}': {}", pattern, message)
            }
            Self::EmptyGlob { pattern } => {
                write!(f, "no files match pattern '{}'", pattern)
            }
        }
    }
}

impl std::error::Error for GateError {}

/// Result type alias for gate operations.
pub type GateResult<T> = Result<T, GateError>;

impl From<serde_json::Error> for GateError {
    fn from(e: serde_json::Error) -> Self {
        Self::Shape { message: e.to_string() }
    }
}
