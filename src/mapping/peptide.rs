//! Peptide modification localizer
//!
//! Turns a modified-peptide annotation into coordinates on the reference
//! sequence and a set of phosphorylation calls. Two notations are accepted:
//!
//! - bracketed: `_(ac)AAAITDM(ox)ADLEELSRLS(ph)PLPPGS(ph)PGSAAR_`
//! - inline: `AAAITDMADLEELSRLpSPLPPGpSPGSAAR`
//!
//! Only phosphorylation survives; every other modification is stripped
//! before the coordinate search.

use super::sequence::ReferenceSequences;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A phosphorylation call on the reference sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModificationCall {
    pub residue: char,
    /// 1-indexed position on the reference sequence
    pub position: u32,
}

impl ModificationCall {
    pub fn new(residue: char, position: u32) -> Self {
        Self {
            residue: residue.to_ascii_uppercase(),
            position,
        }
    }
}

impl std::fmt::Display for ModificationCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.residue, self.position)
    }
}

/// Unannotated peptide plus the offsets of its phosphorylated residues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedPeptide {
    pub sequence: String,
    /// (residue, 0-based offset within `sequence`)
    pub phospho: Vec<(char, usize)>,
}

/// Where a peptide sits on its reference sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localization {
    /// 1-indexed, inclusive
    pub start: u32,
    /// 1-indexed, inclusive
    pub end: u32,
    pub calls: BTreeSet<ModificationCall>,
}

impl Localization {
    pub fn covers(&self, position: u32) -> bool {
        self.start <= position && position <= self.end
    }

    pub fn has_call_at(&self, position: u32) -> bool {
        self.calls.iter().any(|c| c.position == position)
    }

    pub fn is_modified(&self) -> bool {
        !self.calls.is_empty()
    }
}

/// One measurement row attributed to one accession
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeptideRecord {
    pub accession: String,
    /// Peptide as annotated in the input
    pub peptide: String,
    pub value: Option<f64>,
    pub experiment: String,
    /// None until localized, or when the peptide could not be placed
    pub localization: Option<Localization>,
}

impl PeptideRecord {
    pub fn new(
        accession: impl Into<String>,
        peptide: impl Into<String>,
        value: Option<f64>,
        experiment: impl Into<String>,
    ) -> Self {
        Self {
            accession: accession.into(),
            peptide: peptide.into(),
            value,
            experiment: experiment.into(),
            localization: None,
        }
    }

    /// Localize against the accession's reference sequence
    ///
    /// Returns whether the peptide was placed.
    pub fn localize_with(&mut self, references: &ReferenceSequences) -> bool {
        self.localization = references
            .get(&self.accession)
            .and_then(|reference| localize(&self.peptide, reference));
        self.localization.is_some()
    }

    pub fn is_localized(&self) -> bool {
        self.localization.is_some()
    }
}

/// Whether a bracketed token denotes phosphorylation
fn is_phospho_token(token: &str) -> bool {
    let token = token.trim().to_ascii_lowercase();
    token.starts_with("ph") || token == "unimod:21"
}

/// Whether an inline lowercase prefix denotes phosphorylation
fn is_phospho_prefix(prefix: &str) -> bool {
    prefix == "p" || prefix == "ph"
}

fn is_bracketed(annotated: &str) -> bool {
    annotated.contains(['(', '[', '_'])
}

/// Strip annotation, keeping track of phosphorylated residues
pub fn strip_annotation(annotated: &str) -> StrippedPeptide {
    if is_bracketed(annotated) {
        strip_bracketed(annotated)
    } else {
        strip_inline(annotated)
    }
}

fn strip_bracketed(annotated: &str) -> StrippedPeptide {
    let mut sequence = String::new();
    let mut phospho = Vec::new();
    let mut chars = annotated.trim().chars();

    while let Some(c) = chars.next() {
        match c {
            '(' | '[' => {
                let close = if c == '(' { ')' } else { ']' };
                let mut depth = 1;
                let mut token = String::new();
                for inner in chars.by_ref() {
                    if inner == c {
                        depth += 1;
                    } else if inner == close {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    token.push(inner);
                }
                // A token before the first residue (N-terminal) has nothing to modify
                if is_phospho_token(&token) {
                    if let Some(residue) = sequence.chars().last() {
                        phospho.push((residue, sequence.len() - 1));
                    }
                }
            }
            c if c.is_ascii_alphabetic() => sequence.push(c.to_ascii_uppercase()),
            _ => {}
        }
    }

    StrippedPeptide { sequence, phospho }
}

fn strip_inline(annotated: &str) -> StrippedPeptide {
    let mut sequence = String::new();
    let mut phospho = Vec::new();
    let mut prefix = String::new();

    for c in annotated.trim().chars() {
        if c.is_ascii_lowercase() {
            prefix.push(c);
        } else if c.is_ascii_uppercase() {
            if is_phospho_prefix(&prefix) {
                phospho.push((c, sequence.len()));
            }
            prefix.clear();
            sequence.push(c);
        }
    }

    StrippedPeptide { sequence, phospho }
}

/// Place an annotated peptide on a reference sequence (first occurrence)
pub fn localize(annotated: &str, reference: &str) -> Option<Localization> {
    let stripped = strip_annotation(annotated);
    if stripped.sequence.is_empty() {
        return None;
    }

    let index = reference.find(&stripped.sequence)?;
    let start = index as u32 + 1;
    let end = start + stripped.sequence.len() as u32 - 1;
    let calls = stripped
        .phospho
        .iter()
        .map(|&(residue, offset)| ModificationCall::new(residue, start + offset as u32))
        .collect();

    Some(Localization { start, end, calls })
}
