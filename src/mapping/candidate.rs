//! Proteoform candidate scorer
//!
//! Compares one localized peptide against one proteoform's known
//! modification sites and produces a match score in [0, 1.5].

use super::peptide::{Localization, ModificationCall};
use crate::graph::{relationship, EntityKind, Node, NodeId, PathwayGraph};
use crate::query::AdjacencyIndex;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Unmodified peptide over a locus with no known sites
pub const CLEAN_MATCH: f64 = 1.0;
/// Modified peptide over a locus with no known sites
pub const UNVERIFIED_MODIFICATION: f64 = 0.9;
/// Per-site award when peptide and proteoform agree
pub const SITE_AGREES: f64 = 1.0;
/// Per-site award when they disagree
pub const SITE_DISAGREES: f64 = 0.5;
/// Multiplier for an exact match of a modified peptide
pub const EXACT_MATCH_BONUS: f64 = 1.5;
/// Multiplier for calls absent from the accession's catalogue
pub const UNEXPLAINED_PENALTY: f64 = 0.9;
/// Scale ceiling
pub const MAX_SCORE: f64 = CLEAN_MATCH * EXACT_MATCH_BONUS;

const EPSILON: f64 = 1e-9;

/// A known modification site of a proteoform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KnownSite {
    pub residue: char,
    pub position: u32,
}

impl KnownSite {
    pub fn call(&self) -> ModificationCall {
        ModificationCall::new(self.residue, self.position)
    }
}

/// A proteoform reachable from an accession, with its modification set
#[derive(Debug, Clone)]
pub struct ProteoformCandidate {
    pub node_id: NodeId,
    pub name: String,
    pub sites: Vec<KnownSite>,
}

impl ProteoformCandidate {
    /// Positions of known sites inside [start, end]
    pub fn sites_within(&self, localization: &Localization) -> BTreeSet<u32> {
        self.sites
            .iter()
            .map(|s| s.position)
            .filter(|&p| localization.covers(p))
            .collect()
    }
}

/// Every site known for any proteoform of one accession
#[derive(Debug, Clone, Default)]
pub struct ModificationCatalogue {
    calls: HashSet<ModificationCall>,
}

impl ModificationCatalogue {
    pub fn from_candidates(candidates: &[ProteoformCandidate]) -> Self {
        let calls = candidates
            .iter()
            .flat_map(|c| c.sites.iter().map(KnownSite::call))
            .collect();
        Self { calls }
    }

    pub fn contains(&self, call: &ModificationCall) -> bool {
        self.calls.contains(call)
    }

    /// Whether the peptide carries calls nothing in the catalogue explains
    pub fn has_unexplained(&self, localization: &Localization) -> bool {
        localization.calls.iter().any(|c| !self.contains(c))
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Residue letter of a site node: "Y" or "pY"
fn parse_residue(tag: &str) -> Option<char> {
    let tag = tag.trim();
    let mut chars = tag.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(r), None, None) if r.is_ascii_alphabetic() => Some(r.to_ascii_uppercase()),
        (Some('p'), Some(r), None) if r.is_ascii_uppercase() => Some(r),
        _ => None,
    }
}

/// Read a ModificationSite node; None if its residue or position is unknown
pub fn known_site(node: &Node) -> Option<KnownSite> {
    let residue = node.string("residue").and_then(parse_residue)?;
    let position = node.properties.get("position")?.as_i64()?;
    let position = u32::try_from(position).ok().filter(|&p| p > 0)?;
    Some(KnownSite { residue, position })
}

/// Proteoforms an accession belongs to, in node-ID order
pub fn collect_candidates(
    graph: &PathwayGraph,
    index: &AdjacencyIndex<'_>,
    accession: &NodeId,
) -> Vec<ProteoformCandidate> {
    let mut candidates: Vec<ProteoformCandidate> = Vec::new();
    let mut seen: HashSet<&NodeId> = HashSet::new();

    for target in index.targets(accession, relationship::BELONGS_TO) {
        if !seen.insert(target) {
            continue;
        }
        let Some(node) = graph.get_node(target) else {
            continue;
        };
        match node.kind {
            EntityKind::Proteoform => {
                let mut sites = Vec::new();
                for site_id in index.targets(target, relationship::HAS_MODIFICATION) {
                    let Some(site_node) = graph.get_node(site_id) else {
                        continue;
                    };
                    match known_site(site_node) {
                        Some(site) => sites.push(site),
                        None => debug!(site = %site_id, "Site without residue or position ignored"),
                    }
                }
                candidates.push(ProteoformCandidate {
                    node_id: target.clone(),
                    name: node.name().to_string(),
                    sites,
                });
            }
            EntityKind::Accession
            | EntityKind::ModificationSite
            | EntityKind::Complex
            | EntityKind::PhysicalEntity
            | EntityKind::Reaction => {
                debug!(node = %target, kind = %node.kind, "belongs_to target is not a proteoform");
            }
        }
    }

    candidates.sort_by(|a, b| a.node_id.cmp(&b.node_id));
    candidates
}

/// Score one localized peptide against one candidate
pub fn score_candidate(
    localization: &Localization,
    candidate: &ProteoformCandidate,
    catalogue: &ModificationCatalogue,
) -> f64 {
    let poi = candidate.sites_within(localization);

    if poi.is_empty() {
        return if localization.is_modified() {
            UNVERIFIED_MODIFICATION
        } else {
            CLEAN_MATCH
        };
    }

    let total: f64 = poi
        .iter()
        .map(|&p| {
            if localization.has_call_at(p) {
                SITE_AGREES
            } else {
                SITE_DISAGREES
            }
        })
        .sum();
    let mut score = total / poi.len() as f64;

    if (score - SITE_AGREES).abs() < EPSILON && localization.is_modified() {
        score *= EXACT_MATCH_BONUS;
    }
    if catalogue.has_unexplained(localization) {
        score *= UNEXPLAINED_PENALTY;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Edge;

    fn loc(start: u32, end: u32, calls: &[(char, u32)]) -> Localization {
        Localization {
            start,
            end,
            calls: calls.iter().map(|&(r, p)| ModificationCall::new(r, p)).collect(),
        }
    }

    fn candidate(sites: &[(char, u32)]) -> ProteoformCandidate {
        ProteoformCandidate {
            node_id: NodeId::from("pf"),
            name: "pf".to_string(),
            sites: sites
                .iter()
                .map(|&(residue, position)| KnownSite { residue, position })
                .collect(),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_clean_match_without_sites() {
        let pf = candidate(&[]);
        let catalogue = ModificationCatalogue::from_candidates(&[pf.clone()]);
        assert_close(score_candidate(&loc(10, 20, &[]), &pf, &catalogue), 1.0);
    }

    #[test]
    fn test_modified_peptide_over_unknown_locus() {
        let pf = candidate(&[('Y', 50)]);
        let catalogue = ModificationCatalogue::from_candidates(&[pf.clone()]);
        // Y_15 is outside the catalogue, but with empty POI the penalty does not apply
        assert_close(score_candidate(&loc(10, 20, &[('Y', 15)]), &pf, &catalogue), 0.9);
    }

    #[test]
    fn test_exact_informative_match_gets_bonus() {
        let pf = candidate(&[('Y', 1162), ('Y', 1163)]);
        let catalogue = ModificationCatalogue::from_candidates(&[pf.clone()]);
        let peptide = loc(1156, 1165, &[('Y', 1162), ('Y', 1163)]);
        assert_close(score_candidate(&peptide, &pf, &catalogue), 1.5);
    }

    #[test]
    fn test_partial_agreement_averages() {
        let pf = candidate(&[('Y', 1162), ('Y', 1163)]);
        let catalogue = ModificationCatalogue::from_candidates(&[pf.clone()]);
        let peptide = loc(1156, 1165, &[('Y', 1162)]);
        assert_close(score_candidate(&peptide, &pf, &catalogue), 0.75);

        let unmodified = loc(1156, 1165, &[]);
        assert_close(score_candidate(&unmodified, &pf, &catalogue), 0.5);
    }

    #[test]
    fn test_unexplained_calls_penalised() {
        let pf = candidate(&[('Y', 1162), ('Y', 1163)]);
        let catalogue = ModificationCatalogue::from_candidates(&[pf.clone()]);

        let exact_plus_extra = loc(1156, 1165, &[('Y', 1158), ('Y', 1162), ('Y', 1163)]);
        assert_close(score_candidate(&exact_plus_extra, &pf, &catalogue), 1.35);

        let partial_plus_extra = loc(1156, 1165, &[('Y', 1158), ('Y', 1162)]);
        assert_close(score_candidate(&partial_plus_extra, &pf, &catalogue), 0.675);

        let none_plus_extra = loc(1156, 1165, &[('Y', 1158)]);
        assert_close(score_candidate(&none_plus_extra, &pf, &catalogue), 0.45);
    }

    #[test]
    fn test_catalogue_spans_sibling_proteoforms() {
        let triple = candidate(&[('Y', 1158), ('Y', 1162), ('Y', 1163)]);
        let double = candidate(&[('Y', 1162), ('Y', 1163)]);
        let catalogue = ModificationCatalogue::from_candidates(&[triple, double.clone()]);
        assert_eq!(catalogue.len(), 3);

        let peptide = loc(1156, 1165, &[('Y', 1158), ('Y', 1162), ('Y', 1163)]);
        assert_close(score_candidate(&peptide, &double, &catalogue), 1.5);
    }

    #[test]
    fn test_parse_residue_tags() {
        assert_eq!(parse_residue("Y"), Some('Y'));
        assert_eq!(parse_residue("s"), Some('S'));
        assert_eq!(parse_residue("pT"), Some('T'));
        assert_eq!(parse_residue("O-phospho-L-serine"), None);
        assert_eq!(parse_residue(""), None);
    }

    #[test]
    fn test_collect_candidates_reads_sites() {
        let mut graph = PathwayGraph::new("test");
        graph.add_node(
            Node::with_id("acc", EntityKind::Accession).with_property("accession", "P1"),
        );
        graph.add_node(
            Node::with_id("pf:b", EntityKind::Proteoform).with_property("name", "phospho"),
        );
        graph.add_node(Node::with_id("pf:a", EntityKind::Proteoform));
        graph.add_node(Node::with_id("cx", EntityKind::Complex));
        graph.add_node(
            Node::with_id("site:1", EntityKind::ModificationSite)
                .with_property("residue", "Y")
                .with_property("position", 1158i64),
        );
        graph.add_node(
            Node::with_id("site:2", EntityKind::ModificationSite).with_property("residue", "S"),
        );

        let edge = |s: &str, t: &str, rel: &str| Edge::new(NodeId::from(s), NodeId::from(t), rel);
        graph.add_edge(edge("acc", "pf:b", relationship::BELONGS_TO));
        graph.add_edge(edge("acc", "pf:a", relationship::BELONGS_TO));
        graph.add_edge(edge("acc", "cx", relationship::BELONGS_TO));
        graph.add_edge(edge("pf:b", "site:1", relationship::HAS_MODIFICATION));
        graph.add_edge(edge("pf:b", "site:2", relationship::HAS_MODIFICATION));

        let index = AdjacencyIndex::build(&graph);
        let candidates = collect_candidates(&graph, &index, &NodeId::from("acc"));

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].node_id.as_str(), "pf:a");
        assert!(candidates[0].sites.is_empty());
        assert_eq!(candidates[1].name, "phospho");
        assert_eq!(candidates[1].sites, vec![KnownSite { residue: 'Y', position: 1158 }]);
    }
}
