//! Gate pipeline sequencing the validators over one artifact.
//!
//! Mirrors how the CI workflow runs the gates: schema conformance
//! first, and only a schema-clean document proceeds to the structural,
//! confidence, and coverage gates. Library users get the same halting
//! behavior through [`GatePipeline::run`].

use serde::Serialize;
use serde_json::Value;

use crate::confidence::{self, ConfidenceViolation};
use crate::coverage::{self, CoverageReport, DEFAULT_THRESHOLD};
use crate::graph::ReferenceGraph;
use crate::schema::{self, SchemaRule, SchemaViolation};
use crate::structure::{self, StructureReport};
use crate::types::Artifact;

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Minimum acceptable contradiction coverage.
    pub coverage_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Combined findings of all gates for one artifact.
///
/// The downstream sections are `None` when the schema gate failed and
/// the later gates never ran.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ArtifactReport {
    pub schema: Vec<SchemaViolation>,
    pub structure: Option<StructureReport>,
    pub confidence: Option<Vec<ConfidenceViolation>>,
    pub coverage: Option<CoverageReport>,
    pub coverage_threshold: f64,
    pub passed: bool,
}

impl ArtifactReport {
    /// Number of hard errors across all gates that ran. Warnings and
    /// exemptions are not counted; a coverage shortfall counts as one.
    pub fn hard_error_count(&self) -> usize {
        let mut count = self.schema.len();
        if let Some(structure) = &self.structure {
            count += structure.errors.len();
        }
        if let Some(confidence) = &self.confidence {
            count += confidence.len();
        }
        if let Some(coverage) = &self.coverage {
            if !coverage.meets(self.coverage_threshold) {
                count += 1;
            }
        }
        count
    }
}

/// Runs the gates in order over raw artifact documents.
#[derive(Debug, Clone)]
pub struct GatePipeline {
    config: PipelineConfig,
}

impl GatePipeline {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run every gate over a raw document and aggregate the findings.
    ///
    /// Never fails: a document that cannot even be shaped is reported
    /// as a schema-level finding with the later gates skipped.
    pub fn run(&self, document: &Value) -> ArtifactReport {
        let schema_violations = schema::validate(document);
        if !schema_violations.is_empty() {
            return self.halted(schema_violations);
        }

        let artifact = match Artifact::from_value(document) {
            Ok(artifact) => artifact,
            Err(e) => {
                return self.halted(vec![SchemaViolation {
                    path: "root".to_string(),
                    rule: SchemaRule::Type,
                    message: e.to_string(),
                }]);
            }
        };

        let graph = ReferenceGraph::build(&artifact);
        let structure_report = structure::validate(&artifact, &graph);
        let confidence_violations = confidence::validate(&artifact, &graph);
        let coverage_report = coverage::compute(&artifact);

        let passed = structure_report.passed()
            && confidence_violations.is_empty()
            && coverage_report.meets(self.config.coverage_threshold);

        ArtifactReport {
            schema: Vec::new(),
            structure: Some(structure_report),
            confidence: Some(confidence_violations),
            coverage: Some(coverage_report),
            coverage_threshold: self.config.coverage_threshold,
            passed,
        }
    }

    fn halted(&self, schema: Vec<SchemaViolation>) -> ArtifactReport {
        ArtifactReport {
            schema,
            structure: None,
            confidence: None,
            coverage: None,
            coverage_threshold: self.config.coverage_threshold,
            passed: false,
        }
    }
}

impl Default for GatePipeline {
    fn default() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }
}
