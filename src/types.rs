//! Core data types for LSA artifacts.
//!
//! The structs here are the *tolerant* typed model: every field a
//! downstream gate does not strictly need is optional or defaulted, so
//! an artifact with schema defects can still be shaped and examined by
//! the structure, confidence, and coverage gates. Schema conformance of
//! the raw document is the [`crate::schema`] gate's job.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::GateResult;

/// The four entity sections of an LSA artifact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Premise,
    Inference,
    Contradiction,
    Conclusion,
}

impl EntityKind {
    /// Singular name used in diagnostic messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Premise => "premise",
            Self::Inference => "inference",
            Self::Contradiction => "contradiction",
            Self::Conclusion => "conclusion",
        }
    }

    /// Capitalized name for messages that open with the kind.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Premise => "Premise",
            Self::Inference => "Inference",
            Self::Contradiction => "Contradiction",
            Self::Conclusion => "Conclusion",
        }
    }

    /// Top-level document key holding entities of this kind.
    pub fn section(&self) -> &'static str {
        match self {
            Self::Premise => "premises",
            Self::Inference => "inferences",
            Self::Contradiction => "contradictions",
            Self::Conclusion => "conclusions",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a conclusion's decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DecisionState {
    Approved,
    Pending,
    Rejected,
}

impl DecisionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
        }
    }
}

impl Default for DecisionState {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for DecisionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record of a contradiction search performed (or waived) for a claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ContradictionCheck {
    #[serde(default)]
    pub performed: bool,
    #[serde(default)]
    pub exempt: bool,
    #[serde(default)]
    pub exempt_reason: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub search_queries: Vec<String>,
    #[serde(default)]
    pub sources_searched: Option<u64>,
    #[serde(default)]
    pub contradictions_found: Option<u64>,
    #[serde(default)]
    pub methodology: Option<String>,
}

/// Source-grounded factual claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Premise {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub statement: String,
    #[serde(default)]
    pub source_sha256: String,
    #[serde(default)]
    pub byte_range: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub contradiction_check: Option<ContradictionCheck>,
}

impl Premise {
    pub fn new(id: String, statement: String, source_sha256: String, byte_range: String) -> Self {
        Self {
            id,
            statement,
            source_sha256,
            byte_range,
            ..Self::default()
        }
    }
}

/// Derived claim supported by premises or other inferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Inference {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub supports: Vec<String>,
    #[serde(default)]
    pub methodology: String,
    #[serde(default)]
    pub statement: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub contradiction_check: Option<ContradictionCheck>,
}

impl Inference {
    pub fn new(id: String, supports: Vec<String>, methodology: String, statement: String) -> Self {
        Self {
            id,
            supports,
            methodology,
            statement,
            ..Self::default()
        }
    }
}

/// Documented counter-evidence targeting other claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Contradiction {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub statement: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub source_sha256: Option<String>,
    #[serde(default)]
    pub byte_range: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl Contradiction {
    pub fn new(id: String, targets: Vec<String>, statement: String, label: String) -> Self {
        Self {
            id,
            targets,
            statement,
            label,
            ..Self::default()
        }
    }
}

/// Decision-bearing claim aggregating the artifact's reasoning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Conclusion {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub supports: Vec<String>,
    #[serde(default)]
    pub contested_by: Vec<String>,
    #[serde(default)]
    pub statement: String,
    #[serde(default)]
    pub decision_state: Option<DecisionState>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub contradiction_check: Option<ContradictionCheck>,
}

impl Conclusion {
    pub fn new(
        id: String,
        supports: Vec<String>,
        contested_by: Vec<String>,
        statement: String,
        decision_state: DecisionState,
    ) -> Self {
        Self {
            id,
            supports,
            contested_by,
            statement,
            decision_state: Some(decision_state),
            ..Self::default()
        }
    }
}

/// Provenance block identifying who produced the artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Audit {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub signing_key: String,
}

impl Audit {
    pub fn new(author: String, timestamp: String, hash: String, signing_key: String) -> Self {
        Self {
            author,
            timestamp,
            hash,
            signing_key,
        }
    }
}

/// A complete LSA reasoning artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Artifact {
    #[serde(default)]
    pub premises: Vec<Premise>,
    #[serde(default)]
    pub inferences: Vec<Inference>,
    #[serde(default)]
    pub contradictions: Vec<Contradiction>,
    #[serde(default)]
    pub conclusions: Vec<Conclusion>,
    #[serde(default)]
    pub audit: Audit,
}

impl Artifact {
    /// Shape a raw JSON document into the typed model.
    ///
    /// Missing fields default; only a value whose *type* conflicts with
    /// the model (a string where an array belongs, and so on) fails.
    pub fn from_value(value: &serde_json::Value) -> GateResult<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Number of claims subject to contradiction coverage.
    pub fn claim_count(&self) -> usize {
        self.inferences.len() + self.conclusions.len()
    }
}

/// Compute the canonical sha256 digest of a JSON document.
///
/// Keys are serialized in sorted order so the digest is independent of
/// map ordering in the source file.
pub fn artifact_digest(value: &serde_json::Value) -> String {
    let serialized = canonical_json(value);
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Digest over the four entity sections only, the value `audit.hash`
/// is expected to carry.
pub fn audit_digest(value: &serde_json::Value) -> String {
    let mut body = serde_json::Map::new();
    for key in ["premises", "inferences", "contradictions", "conclusions"] {
        if let Some(section) = value.get(key) {
            body.insert(key.to_string(), section.clone());
        }
    }
    artifact_digest(&serde_json::Value::Object(body))
}

/// Produce canonical JSON with deterministic key ordering.
fn canonical_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            let pairs: Vec<String> = keys
                .into_iter()
                .map(|k| {
                    format!(
                        "{}:{}",
                        serde_json::to_string(k).unwrap_or_default(),
                        canonical_json(&map[k])
                    )
                })
                .collect();
            format!("{{{}}}", pairs.join(","))
        }
        serde_json::Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        _ => serde_json::to_string(value).unwrap_or_else(|_| "null".to_string()),
    }
}
