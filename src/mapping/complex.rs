//! Complex score propagation
//!
//! A complex is flattened along "component" edges to its base proteoforms
//! (set semantics, nested complexes expanded, cycles tolerated). Member
//! scores stored on the graph are then averaged up to the complex.

use super::config::{round_to, ComplexAveraging, MappingConfig};
use super::properties::ExperimentKey;
use crate::graph::{relationship, EntityKind, NodeId, PathwayGraph};
use crate::query::{AdjacencyIndex, TraverseQuery};
use std::collections::BTreeSet;

/// Scores computed for one complex
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexScore {
    pub node_id: NodeId,
    pub support: f64,
    pub abundance: Option<f64>,
    /// Accessions behind the members' scores
    pub mapped: BTreeSet<String>,
    /// Base proteoforms after flattening
    pub members: usize,
    pub scored_members: usize,
}

impl ComplexScore {
    pub fn mapped_label(&self) -> String {
        self.mapped.iter().cloned().collect::<Vec<_>>().join(";")
    }
}

/// Base proteoforms of a complex, sorted
pub fn flatten_complex(
    graph: &PathwayGraph,
    index: &AdjacencyIndex<'_>,
    complex: &NodeId,
) -> Vec<NodeId> {
    let result = TraverseQuery::from(complex.clone())
        .unbounded()
        .with_relationship(relationship::COMPONENT)
        .execute(graph, index);

    let members: BTreeSet<NodeId> = result
        .reached()
        .filter(|n| n.kind == EntityKind::Proteoform)
        .map(|n| n.id.clone())
        .collect();
    members.into_iter().collect()
}

fn average(sum: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

/// Complex scores from the member scores already stored for the experiment
///
/// Complexes whose members carry no support score are left out.
pub fn propagate_complexes(
    graph: &PathwayGraph,
    key: &ExperimentKey,
    config: &MappingConfig,
) -> Vec<ComplexScore> {
    let index = AdjacencyIndex::build(graph);
    let support_key = key.support_score();
    let abundance_key = key.abundance_score();
    let mapped_key = key.mapped();

    let mut complexes: Vec<&NodeId> =
        graph.nodes_of_kind(EntityKind::Complex).map(|n| &n.id).collect();
    complexes.sort();

    let mut scores = Vec::new();
    for complex in complexes {
        let members = flatten_complex(graph, &index, complex);
        if members.is_empty() {
            continue;
        }

        let mut support_sum = 0.0;
        let mut supported = 0usize;
        let mut abundance_sum = 0.0;
        let mut quantified = 0usize;
        let mut mapped = BTreeSet::new();

        for member in members.iter().filter_map(|id| graph.get_node(id)) {
            if let Some(support) = member.float(&support_key) {
                support_sum += support;
                supported += 1;
            }
            if let Some(abundance) = member.float(&abundance_key) {
                abundance_sum += abundance;
                quantified += 1;
            }
            if let Some(accessions) = member.string(&mapped_key) {
                mapped.extend(accessions.split(';').filter(|a| !a.is_empty()).map(str::to_string));
            }
        }

        if supported == 0 {
            continue;
        }

        let (support_count, abundance_count) = match config.complex_averaging {
            ComplexAveraging::AllMembers => (members.len(), members.len()),
            ComplexAveraging::ScoredMembers => (supported, quantified),
        };
        let Some(support) = average(support_sum, support_count) else {
            continue;
        };
        let abundance = if quantified > 0 {
            average(abundance_sum, abundance_count).map(|a| round_to(a, config.abundance_precision))
        } else {
            None
        };

        scores.push(ComplexScore {
            node_id: complex.clone(),
            support: round_to(support, config.support_precision),
            abundance,
            mapped,
            members: members.len(),
            scored_members: supported,
        });
    }

    scores
}
