//! Confidence propagation gate.
//!
//! Confidence flows from premises through inferences in dependency
//! order: an inference may exceed its weakest support by at most the
//! fixed methodology bonus, and a contested conclusion is capped
//! outright. Evaluation order comes from a topological sort of the
//! inference subgraph, so the result does not depend on declaration
//! order in the file.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::graph::{NodeId, ReferenceGraph};
use crate::types::{Artifact, EntityKind};

/// An inference may exceed its weakest support by ten percent.
pub const METHODOLOGY_BONUS: f64 = 1.1;

/// Ceiling for conclusions with open contestations.
pub const CONTESTED_CEILING: f64 = 0.8;

/// One breach of the confidence propagation rules.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum ConfidenceViolation {
    /// Entity that must carry a confidence score but does not.
    MissingConfidence { id: String, kind: EntityKind },
    /// Confidence outside the closed interval [0, 1].
    OutOfRange {
        id: String,
        kind: EntityKind,
        value: f64,
    },
    /// Supporting id with no confidence available to propagate from.
    UnresolvedSupport { id: String, reference: String },
    /// Inference confidence above the bonus-adjusted minimum support.
    ExceedsSupportBound {
        id: String,
        value: f64,
        bound: f64,
        min_support: f64,
    },
    /// Contested conclusion above the fixed ceiling.
    ContestedAboveCeiling {
        id: String,
        value: f64,
        contested: usize,
    },
}

impl fmt::Display for ConfidenceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingConfidence { id, kind } => {
                write!(f, "{} {} missing confidence score", kind.title(), id)
            }
            Self::OutOfRange { id, kind, value } => {
                write!(
                    f,
                    "{} {} confidence {} is outside the range [0, 1]",
                    kind.title(),
                    id,
                    value
                )
            }
            Self::UnresolvedSupport { id, reference } => {
                write!(f, "Inference {} references unknown support: {}", id, reference)
            }
            Self::ExceedsSupportBound {
                id,
                value,
                bound,
                min_support,
            } => {
                write!(
                    f,
                    "Inference {} confidence {:.3} exceeds maximum allowed {:.3} (min support: {:.3})",
                    id, value, bound, min_support
                )
            }
            Self::ContestedAboveCeiling {
                id,
                value,
                contested,
            } => {
                write!(
                    f,
                    "Conclusion {} is contested by {} contradiction(s) but has high confidence {:.3} (should be <= {})",
                    id, contested, value, CONTESTED_CEILING
                )
            }
        }
    }
}

/// Check confidence propagation over a whole artifact.
///
/// Premises seed the confidence map, inferences are evaluated in
/// topological order, conclusions are checked last. All violations are
/// collected; nothing stops at the first finding.
pub fn validate(artifact: &Artifact, graph: &ReferenceGraph) -> Vec<ConfidenceViolation> {
    let mut violations = Vec::new();
    let mut confidences: HashMap<&str, f64> = HashMap::new();

    for premise in &artifact.premises {
        match premise.confidence {
            None => violations.push(ConfidenceViolation::MissingConfidence {
                id: premise.id.clone(),
                kind: EntityKind::Premise,
            }),
            Some(c) => {
                if !(0.0..=1.0).contains(&c) {
                    violations.push(ConfidenceViolation::OutOfRange {
                        id: premise.id.clone(),
                        kind: EntityKind::Premise,
                        value: c,
                    });
                }
                // an out-of-range premise still seeds the map, so its
                // dependents are judged against what was written
                confidences.insert(premise.id.as_str(), c);
            }
        }
    }

    for pos in propagation_order(graph, artifact.inferences.len()) {
        let inference = &artifact.inferences[pos];
        let conf = match inference.confidence {
            None => {
                violations.push(ConfidenceViolation::MissingConfidence {
                    id: inference.id.clone(),
                    kind: EntityKind::Inference,
                });
                continue;
            }
            Some(c) if !(0.0..=1.0).contains(&c) => {
                violations.push(ConfidenceViolation::OutOfRange {
                    id: inference.id.clone(),
                    kind: EntityKind::Inference,
                    value: c,
                });
                continue;
            }
            Some(c) => c,
        };

        let mut supports = Vec::with_capacity(inference.supports.len());
        for reference in &inference.supports {
            match confidences.get(reference.as_str()) {
                Some(&c) => supports.push(c),
                None => violations.push(ConfidenceViolation::UnresolvedSupport {
                    id: inference.id.clone(),
                    reference: reference.clone(),
                }),
            }
        }
        if let Some(min_support) = supports.iter().copied().reduce(f64::min) {
            let bound = min_support * METHODOLOGY_BONUS;
            if conf > bound {
                violations.push(ConfidenceViolation::ExceedsSupportBound {
                    id: inference.id.clone(),
                    value: conf,
                    bound,
                    min_support,
                });
            }
        }
        confidences.insert(inference.id.as_str(), conf);
    }

    for conclusion in &artifact.conclusions {
        let conf = match conclusion.confidence {
            None => {
                violations.push(ConfidenceViolation::MissingConfidence {
                    id: conclusion.id.clone(),
                    kind: EntityKind::Conclusion,
                });
                continue;
            }
            Some(c) if !(0.0..=1.0).contains(&c) => {
                violations.push(ConfidenceViolation::OutOfRange {
                    id: conclusion.id.clone(),
                    kind: EntityKind::Conclusion,
                    value: c,
                });
                continue;
            }
            Some(c) => c,
        };
        if !conclusion.contested_by.is_empty() && conf > CONTESTED_CEILING {
            violations.push(ConfidenceViolation::ContestedAboveCeiling {
                id: conclusion.id.clone(),
                value: conf,
                contested: conclusion.contested_by.len(),
            });
        }
    }

    violations
}

/// Positions into the inference section, dependency-first.
///
/// Kahn's algorithm over the inference-to-inference support edges.
/// Ties break toward declaration order via a min-heap on arena index.
/// Inferences on a cycle never become ready; they are appended at the
/// end in declaration order so their own defects still get reported.
fn propagation_order(graph: &ReferenceGraph, count: usize) -> Vec<usize> {
    let mut in_degree = vec![0usize; graph.len()];
    let mut dependents: Vec<Vec<NodeId>> = vec![Vec::new(); graph.len()];
    let inference_nodes: Vec<NodeId> = graph.nodes_of_kind(EntityKind::Inference).collect();

    for &node_id in &inference_nodes {
        for edge in graph.supports(node_id) {
            if let Some(target) = edge.to {
                if graph.node(target).kind == EntityKind::Inference {
                    in_degree[node_id] += 1;
                    dependents[target].push(node_id);
                }
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<NodeId>> = inference_nodes
        .iter()
        .copied()
        .filter(|&n| in_degree[n] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(count);
    let mut placed = vec![false; count];
    while let Some(Reverse(node_id)) = ready.pop() {
        let pos = graph.node(node_id).pos;
        order.push(pos);
        placed[pos] = true;
        for &dependent in &dependents[node_id] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }
    for (pos, was_placed) in placed.iter().enumerate() {
        if !*was_placed {
            order.push(pos);
        }
    }
    order
}
