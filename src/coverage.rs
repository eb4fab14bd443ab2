//! Contradiction coverage metric.
//!
//! Every inference and conclusion is a claim. A claim is *checkable*
//! unless its `contradiction_check` marks it exempt, and *checked* when
//! a contradiction targets it or its check records `performed: true`.
//! Coverage is checked over checkable; an artifact with no checkable
//! claims is vacuously covered.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::{Artifact, ContradictionCheck};

/// Default minimum acceptable coverage ratio.
pub const DEFAULT_THRESHOLD: f64 = 0.90;

/// A claim excused from contradiction search, with its recorded reason.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Exemption {
    pub id: String,
    pub reason: String,
}

/// Aggregate coverage numbers for one artifact.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoverageReport {
    pub total_claims: usize,
    pub exempt_claims: usize,
    pub checkable_claims: usize,
    pub checked_claims: usize,
    pub unchecked_claims: usize,
    /// Ratio in [0, 1]; 1.0 when nothing is checkable.
    pub coverage: f64,
    /// Checkable but unchecked claim ids, lexicographically sorted.
    pub unchecked_ids: Vec<String>,
    /// Exempt claims in declaration order, inferences first.
    pub exemptions: Vec<Exemption>,
}

impl CoverageReport {
    /// True when this report's coverage meets the given threshold.
    pub fn meets(&self, threshold: f64) -> bool {
        validate_threshold(self.coverage, threshold)
    }
}

/// Compare an observed coverage ratio against a threshold.
pub fn validate_threshold(coverage: f64, threshold: f64) -> bool {
    coverage >= threshold
}

/// Compute contradiction coverage for one artifact.
pub fn compute(artifact: &Artifact) -> CoverageReport {
    let (checkable, exemptions) = partition(artifact);

    let mut checked: BTreeSet<String> = BTreeSet::new();
    for contradiction in &artifact.contradictions {
        for target in &contradiction.targets {
            if checkable.contains(target) {
                checked.insert(target.clone());
            }
        }
    }
    for (id, check) in claims(artifact) {
        if check.map_or(false, |c| c.performed) && checkable.contains(id) {
            checked.insert(id.clone());
        }
    }

    let checkable_claims = checkable.len();
    let checked_claims = checked.len();
    let coverage = if checkable_claims == 0 {
        1.0
    } else {
        checked_claims as f64 / checkable_claims as f64
    };
    let unchecked_ids: Vec<String> = checkable.difference(&checked).cloned().collect();

    CoverageReport {
        total_claims: artifact.claim_count(),
        exempt_claims: exemptions.len(),
        checkable_claims,
        checked_claims,
        unchecked_claims: checkable_claims - checked_claims,
        coverage,
        unchecked_ids,
        exemptions,
    }
}

fn claims<'a>(
    artifact: &'a Artifact,
) -> impl Iterator<Item = (&'a String, Option<&'a ContradictionCheck>)> + 'a {
    artifact
        .inferences
        .iter()
        .map(|i| (&i.id, i.contradiction_check.as_ref()))
        .chain(
            artifact
                .conclusions
                .iter()
                .map(|c| (&c.id, c.contradiction_check.as_ref())),
        )
}

/// Split claims into the checkable set and the exemption list.
fn partition(artifact: &Artifact) -> (BTreeSet<String>, Vec<Exemption>) {
    claims(artifact).fold(
        (BTreeSet::new(), Vec::new()),
        |(mut checkable, mut exemptions), (id, check)| {
            match check {
                Some(check) if check.exempt => exemptions.push(Exemption {
                    id: id.clone(),
                    reason: check
                        .exempt_reason
                        .clone()
                        .unwrap_or_else(|| "unspecified".to_string()),
                }),
                _ => {
                    checkable.insert(id.clone());
                }
            }
            (checkable, exemptions)
        },
    )
}
