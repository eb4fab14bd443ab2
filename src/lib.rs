//! LSA Gate - validation pipeline for LSA reasoning artifacts
//!
//! Four gates over JSON reasoning artifacts: schema conformance,
//! structural integrity of the reference graph, confidence propagation
//! bounds, and contradiction coverage. Defects inside an artifact are
//! reported as diagnostic values; `Err` is reserved for operational
//! failures such as unreadable input.

pub mod error;
pub mod cli;
pub mod confidence;
pub mod coverage;
pub mod graph;
pub mod pipeline;
pub mod schema;
pub mod structure;
pub mod types;

pub use error::{GateError, GateResult};
pub use confidence::ConfidenceViolation;
pub use coverage::CoverageReport;
pub use graph::ReferenceGraph;
pub use pipeline::{ArtifactReport, GatePipeline, PipelineConfig};
pub use schema::{SchemaRule, SchemaViolation};
pub use structure::{StructureError, StructureReport, StructureWarning};
pub use types::{
    artifact_digest, audit_digest, Artifact, Audit, Conclusion, Contradiction,
    ContradictionCheck, DecisionState, EntityKind, Inference, Premise,
};
