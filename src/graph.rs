//! Reference graph over a single artifact.
//!
//! Entities are stored in a flat arena indexed by [`NodeId`], in
//! declaration order (premises, then inferences, contradictions,
//! conclusions). Every reference list in the artifact becomes a typed
//! edge list; edges keep the raw id string alongside the resolved
//! arena index so validators can report exactly what was written.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{Artifact, EntityKind};

/// Index of a node in the arena.
pub type NodeId = usize;

/// Which reference list an edge came from.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Supports,
    Targets,
    ContestedBy,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supports => "supports",
            Self::Targets => "targets",
            Self::ContestedBy => "contested_by",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entity in the arena.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    pub id: &'a str,
    pub kind: EntityKind,
    /// Position of the entity within its section vector.
    pub pos: usize,
}

/// A single outgoing reference, resolved against the id index.
#[derive(Debug, Clone, Copy)]
pub struct Edge<'a> {
    /// The id string exactly as written in the artifact.
    pub reference: &'a str,
    /// Arena index of the referenced entity, `None` when it is dangling.
    pub to: Option<NodeId>,
}

/// Id index plus adjacency lists for one artifact.
///
/// Building the graph never fails: dangling references become edges
/// with `to: None`, and a duplicated id resolves to its first
/// declaration. Defects are the validators' business.
#[derive(Debug, Clone)]
pub struct ReferenceGraph<'a> {
    nodes: Vec<Node<'a>>,
    index: HashMap<&'a str, NodeId>,
    supports: Vec<Vec<Edge<'a>>>,
    targets: Vec<Vec<Edge<'a>>>,
    contested_by: Vec<Vec<Edge<'a>>>,
}

impl<'a> ReferenceGraph<'a> {
    pub fn build(artifact: &'a Artifact) -> Self {
        let mut nodes = Vec::with_capacity(
            artifact.premises.len()
                + artifact.inferences.len()
                + artifact.contradictions.len()
                + artifact.conclusions.len(),
        );
        let mut index: HashMap<&str, NodeId> = HashMap::new();

        let mut push = |nodes: &mut Vec<Node<'a>>,
                        index: &mut HashMap<&'a str, NodeId>,
                        id: &'a str,
                        kind: EntityKind,
                        pos: usize| {
            let node_id = nodes.len();
            nodes.push(Node { id, kind, pos });
            // first declaration wins on duplicate ids
            index.entry(id).or_insert(node_id);
        };

        for (pos, premise) in artifact.premises.iter().enumerate() {
            push(&mut nodes, &mut index, &premise.id, EntityKind::Premise, pos);
        }
        for (pos, inference) in artifact.inferences.iter().enumerate() {
            push(&mut nodes, &mut index, &inference.id, EntityKind::Inference, pos);
        }
        for (pos, contradiction) in artifact.contradictions.iter().enumerate() {
            push(
                &mut nodes,
                &mut index,
                &contradiction.id,
                EntityKind::Contradiction,
                pos,
            );
        }
        for (pos, conclusion) in artifact.conclusions.iter().enumerate() {
            push(
                &mut nodes,
                &mut index,
                &conclusion.id,
                EntityKind::Conclusion,
                pos,
            );
        }

        let mut supports = vec![Vec::new(); nodes.len()];
        let mut targets = vec![Vec::new(); nodes.len()];
        let mut contested_by = vec![Vec::new(); nodes.len()];

        let resolve = |index: &HashMap<&str, NodeId>, reference: &'a str| Edge {
            reference,
            to: index.get(reference).copied(),
        };

        let mut node_id = artifact.premises.len();
        for inference in &artifact.inferences {
            supports[node_id] = inference
                .supports
                .iter()
                .map(|r| resolve(&index, r))
                .collect();
            node_id += 1;
        }
        for contradiction in &artifact.contradictions {
            targets[node_id] = contradiction
                .targets
                .iter()
                .map(|r| resolve(&index, r))
                .collect();
            node_id += 1;
        }
        for conclusion in &artifact.conclusions {
            supports[node_id] = conclusion
                .supports
                .iter()
                .map(|r| resolve(&index, r))
                .collect();
            contested_by[node_id] = conclusion
                .contested_by
                .iter()
                .map(|r| resolve(&index, r))
                .collect();
            node_id += 1;
        }

        Self {
            nodes,
            index,
            supports,
            targets,
            contested_by,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Node<'a> {
        self.nodes[id]
    }

    pub fn nodes(&self) -> &[Node<'a>] {
        &self.nodes
    }

    /// Look up an id, honoring first-declaration-wins for duplicates.
    pub fn resolve(&self, reference: &str) -> Option<NodeId> {
        self.index.get(reference).copied()
    }

    pub fn kind_of(&self, reference: &str) -> Option<EntityKind> {
        self.resolve(reference).map(|n| self.nodes[n].kind)
    }

    pub fn supports(&self, node: NodeId) -> &[Edge<'a>] {
        &self.supports[node]
    }

    pub fn targets(&self, node: NodeId) -> &[Edge<'a>] {
        &self.targets[node]
    }

    pub fn contested_by(&self, node: NodeId) -> &[Edge<'a>] {
        &self.contested_by[node]
    }

    /// Arena ids of a given kind, in declaration order.
    pub fn nodes_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.kind == kind)
            .map(|(i, _)| i)
    }
}
