//! Structural integrity gate.
//!
//! Walks the reference graph looking for support cycles, dangling or
//! wrongly-kinded references (hard errors), and for orphaned or
//! unacknowledged entities (warnings). Warnings never fail the gate.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::graph::{EdgeKind, NodeId, ReferenceGraph};
use crate::types::{Artifact, DecisionState, EntityKind};

/// Hard structural defect: the artifact's reference graph is unsound.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum StructureError {
    /// Support chain among inferences that loops back on itself.
    Cycle { members: Vec<String> },
    /// Reference to an id that is not declared anywhere.
    DanglingReference {
        source: String,
        edge: EdgeKind,
        reference: String,
    },
    /// Reference that resolves to an entity of an unacceptable kind.
    WrongKindReference {
        source: String,
        edge: EdgeKind,
        reference: String,
        expected: &'static str,
        actual: EntityKind,
    },
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle { members } => {
                write!(
                    f,
                    "Circular dependency detected involving {}",
                    members.join(", ")
                )
            }
            Self::DanglingReference {
                source,
                edge,
                reference,
            } => {
                write!(f, "{} references unknown id '{}' in {}", source, reference, edge)
            }
            Self::WrongKindReference {
                source,
                edge,
                reference,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "{} {} reference '{}' resolves to a {}, expected {}",
                    source, edge, reference, actual, expected
                )
            }
        }
    }
}

/// Advisory finding: suspicious but not disqualifying.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum StructureWarning {
    /// Premise or inference that nothing else refers to.
    Orphan { id: String, kind: EntityKind },
    /// Contradiction with targets that no conclusion acknowledges.
    UnacknowledgedContradiction { id: String },
    /// Approved conclusion that still carries open contestations.
    ContestedApproval { id: String, contested: usize },
}

impl fmt::Display for StructureWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orphan { id, .. } => {
                write!(
                    f,
                    "Orphaned claim {} is never referenced by any supports or targets list",
                    id
                )
            }
            Self::UnacknowledgedContradiction { id } => {
                write!(
                    f,
                    "Contradiction {} targets claims but is not referenced by any conclusion",
                    id
                )
            }
            Self::ContestedApproval { id, contested } => {
                write!(
                    f,
                    "Conclusion {} is approved despite {} open contestation(s)",
                    id, contested
                )
            }
        }
    }
}

/// Outcome of the structural gate for one artifact.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct StructureReport {
    pub errors: Vec<StructureError>,
    pub warnings: Vec<StructureWarning>,
}

impl StructureReport {
    /// True when no hard errors were found. Warnings do not count.
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate reference integrity of an artifact.
///
/// Findings are reported in a fixed order: cycles, then reference
/// errors per entity in declaration order, then warnings. Running the
/// gate twice on the same artifact yields identical reports.
pub fn validate(artifact: &Artifact, graph: &ReferenceGraph) -> StructureReport {
    let mut report = StructureReport::default();
    check_cycles(graph, &mut report.errors);
    check_references(graph, &mut report.errors);
    check_orphans(graph, &mut report.warnings);
    check_unacknowledged(graph, &mut report.warnings);
    check_contested_approvals(artifact, &mut report.warnings);
    report
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Iterative three-color depth-first search over inference support
/// edges. A back-edge into a gray node closes a cycle; every inference
/// on the gray segment is reported as a member.
fn check_cycles(graph: &ReferenceGraph, errors: &mut Vec<StructureError>) {
    let mut colors = vec![Color::White; graph.len()];
    for root in graph.nodes_of_kind(EntityKind::Inference) {
        if colors[root] != Color::White {
            continue;
        }
        colors[root] = Color::Gray;
        // (node, next-edge cursor) frames instead of recursion
        let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
        let mut path: Vec<NodeId> = vec![root];
        while let Some(&(node, cursor)) = stack.last() {
            let edges = graph.supports(node);
            if cursor >= edges.len() {
                stack.pop();
                path.pop();
                colors[node] = Color::Black;
                continue;
            }
            if let Some(frame) = stack.last_mut() {
                frame.1 += 1;
            }
            let Some(next) = edges[cursor].to else {
                continue;
            };
            if graph.node(next).kind != EntityKind::Inference {
                continue;
            }
            match colors[next] {
                Color::White => {
                    colors[next] = Color::Gray;
                    stack.push((next, 0));
                    path.push(next);
                }
                Color::Gray => {
                    if let Some(pos) = path.iter().position(|&p| p == next) {
                        let members = path[pos..]
                            .iter()
                            .map(|&p| graph.node(p).id.to_string())
                            .collect();
                        errors.push(StructureError::Cycle { members });
                    }
                }
                Color::Black => {}
            }
        }
    }
}

fn check_references(graph: &ReferenceGraph, errors: &mut Vec<StructureError>) {
    for node_id in graph.nodes_of_kind(EntityKind::Inference) {
        let node = graph.node(node_id);
        for edge in graph.supports(node_id) {
            match edge.to {
                None => errors.push(StructureError::DanglingReference {
                    source: node.id.to_string(),
                    edge: EdgeKind::Supports,
                    reference: edge.reference.to_string(),
                }),
                Some(target) => {
                    let kind = graph.node(target).kind;
                    if kind != EntityKind::Premise && kind != EntityKind::Inference {
                        errors.push(StructureError::WrongKindReference {
                            source: node.id.to_string(),
                            edge: EdgeKind::Supports,
                            reference: edge.reference.to_string(),
                            expected: "premise or inference",
                            actual: kind,
                        });
                    }
                }
            }
        }
    }

    for node_id in graph.nodes_of_kind(EntityKind::Conclusion) {
        let node = graph.node(node_id);
        for edge in graph.supports(node_id) {
            match edge.to {
                None => errors.push(StructureError::DanglingReference {
                    source: node.id.to_string(),
                    edge: EdgeKind::Supports,
                    reference: edge.reference.to_string(),
                }),
                Some(target) => {
                    let kind = graph.node(target).kind;
                    if kind == EntityKind::Contradiction {
                        errors.push(StructureError::WrongKindReference {
                            source: node.id.to_string(),
                            edge: EdgeKind::Supports,
                            reference: edge.reference.to_string(),
                            expected: "premise, inference, or conclusion",
                            actual: kind,
                        });
                    }
                }
            }
        }
        for edge in graph.contested_by(node_id) {
            match edge.to {
                None => errors.push(StructureError::DanglingReference {
                    source: node.id.to_string(),
                    edge: EdgeKind::ContestedBy,
                    reference: edge.reference.to_string(),
                }),
                Some(target) => {
                    let kind = graph.node(target).kind;
                    if kind != EntityKind::Contradiction {
                        errors.push(StructureError::WrongKindReference {
                            source: node.id.to_string(),
                            edge: EdgeKind::ContestedBy,
                            reference: edge.reference.to_string(),
                            expected: "contradiction",
                            actual: kind,
                        });
                    }
                }
            }
        }
    }

    // contradictions may target any declared entity
    for node_id in graph.nodes_of_kind(EntityKind::Contradiction) {
        let node = graph.node(node_id);
        for edge in graph.targets(node_id) {
            if edge.to.is_none() {
                errors.push(StructureError::DanglingReference {
                    source: node.id.to_string(),
                    edge: EdgeKind::Targets,
                    reference: edge.reference.to_string(),
                });
            }
        }
    }
}

fn check_orphans(graph: &ReferenceGraph, warnings: &mut Vec<StructureWarning>) {
    let mut referenced: HashSet<NodeId> = HashSet::new();
    for node_id in 0..graph.len() {
        for edge in graph.supports(node_id).iter().chain(graph.targets(node_id)) {
            if let Some(target) = edge.to {
                referenced.insert(target);
            }
        }
    }
    for (node_id, node) in graph.nodes().iter().enumerate() {
        if node.kind != EntityKind::Premise && node.kind != EntityKind::Inference {
            continue;
        }
        if !referenced.contains(&node_id) {
            warnings.push(StructureWarning::Orphan {
                id: node.id.to_string(),
                kind: node.kind,
            });
        }
    }
}

fn check_unacknowledged(graph: &ReferenceGraph, warnings: &mut Vec<StructureWarning>) {
    let mut acknowledged: HashSet<NodeId> = HashSet::new();
    for node_id in graph.nodes_of_kind(EntityKind::Conclusion) {
        for edge in graph.contested_by(node_id) {
            if let Some(target) = edge.to {
                acknowledged.insert(target);
            }
        }
    }
    for node_id in graph.nodes_of_kind(EntityKind::Contradiction) {
        if graph.targets(node_id).is_empty() {
            continue;
        }
        if !acknowledged.contains(&node_id) {
            warnings.push(StructureWarning::UnacknowledgedContradiction {
                id: graph.node(node_id).id.to_string(),
            });
        }
    }
}

fn check_contested_approvals(artifact: &Artifact, warnings: &mut Vec<StructureWarning>) {
    for conclusion in &artifact.conclusions {
        if conclusion.decision_state == Some(DecisionState::Approved)
            && !conclusion.contested_by.is_empty()
        {
            warnings.push(StructureWarning::ContestedApproval {
                id: conclusion.id.clone(),
                contested: conclusion.contested_by.len(),
            });
        }
    }
}
