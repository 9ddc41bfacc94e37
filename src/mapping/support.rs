//! Proteoform support aggregation
//!
//! Per accession: score every localized record against every candidate,
//! sum per candidate and divide by the accession's record count. Accessions
//! aliasing onto one proteoform are resolved on the [`ScoreBoard`].

use super::candidate::{score_candidate, ModificationCatalogue, ProteoformCandidate};
use super::config::SupportDenominator;
use super::peptide::PeptideRecord;
use crate::graph::NodeId;
use dashmap::DashMap;
use std::collections::BTreeSet;

const TIE_EPSILON: f64 = 1e-9;

/// Candidate scores of the localized records of one accession
///
/// `rows[c][r]` is the score of record `r` against candidate `c`.
#[derive(Debug, Clone)]
pub struct ScoreMatrix {
    rows: Vec<Vec<f64>>,
}

impl ScoreMatrix {
    /// Score every localized record against every candidate
    pub fn build(records: &[&PeptideRecord], candidates: &[ProteoformCandidate]) -> Self {
        let catalogue = ModificationCatalogue::from_candidates(candidates);
        let rows = candidates
            .iter()
            .map(|candidate| {
                records
                    .iter()
                    .map(|record| match record.localization {
                        Some(ref loc) => score_candidate(loc, candidate, &catalogue),
                        None => 0.0,
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn row(&self, candidate: usize) -> &[f64] {
        self.rows.get(candidate).map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn candidate_count(&self) -> usize {
        self.rows.len()
    }
}

/// Sum of one candidate's peptide scores over the chosen denominator
///
/// Returns None when the denominator is zero.
pub fn support_score(
    scores: &[f64],
    total_records: usize,
    localized_records: usize,
    denominator: SupportDenominator,
) -> Option<f64> {
    let divisor = match denominator {
        SupportDenominator::AllPeptides => total_records,
        SupportDenominator::LocalizedPeptides => localized_records,
    };
    if divisor == 0 {
        return None;
    }
    Some(scores.iter().sum::<f64>() / divisor as f64)
}

/// A winning score and the accession that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Winner {
    pub value: f64,
    pub accession: String,
}

impl Winner {
    /// Larger value wins; on a tie the lexicographically smaller accession
    fn beaten_by(&self, value: f64, accession: &str) -> bool {
        if value > self.value + TIE_EPSILON {
            true
        } else if (value - self.value).abs() <= TIE_EPSILON {
            accession < self.accession.as_str()
        } else {
            false
        }
    }
}

/// Scores accumulated for one proteoform within one experiment
#[derive(Debug, Clone, Default)]
pub struct ProteoformScore {
    pub support: Option<Winner>,
    pub abundance: Option<Winner>,
    /// Every accession that offered a score
    pub mapped: BTreeSet<String>,
}

impl ProteoformScore {
    pub fn mapped_label(&self) -> String {
        self.mapped.iter().cloned().collect::<Vec<_>>().join(";")
    }
}

/// Concurrent keep-max board keyed by proteoform node
///
/// Each offer holds the entry's shard lock for the whole read-compare-write,
/// so parallel accessions aliasing one node cannot lose an update. Support
/// and abundance winners are chosen independently.
#[derive(Debug, Default)]
pub struct ScoreBoard {
    entries: DashMap<NodeId, ProteoformScore>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offer_support(&self, node: &NodeId, accession: &str, value: f64) {
        let mut entry = self.entries.entry(node.clone()).or_default();
        entry.mapped.insert(accession.to_string());
        let replace = match entry.support {
            Some(ref current) => current.beaten_by(value, accession),
            None => true,
        };
        if replace {
            entry.support = Some(Winner {
                value,
                accession: accession.to_string(),
            });
        }
    }

    pub fn offer_abundance(&self, node: &NodeId, accession: &str, value: f64) {
        let mut entry = self.entries.entry(node.clone()).or_default();
        entry.mapped.insert(accession.to_string());
        let replace = match entry.abundance {
            Some(ref current) => current.beaten_by(value, accession),
            None => true,
        };
        if replace {
            entry.abundance = Some(Winner {
                value,
                accession: accession.to_string(),
            });
        }
    }

    pub fn get(&self, node: &NodeId) -> Option<ProteoformScore> {
        self.entries.get(node).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain the board in node-ID order
    pub fn into_sorted(self) -> Vec<(NodeId, ProteoformScore)> {
        let mut scores: Vec<(NodeId, ProteoformScore)> = self.entries.into_iter().collect();
        scores.sort_by(|a, b| a.0.cmp(&b.0));
        scores
    }
}
