//! Edge-weight derivation
//!
//! Downstream traversals minimize weight, so relevance maps to low weight:
//!
//! - support: `1.5 - support`, ceiling 1.5 for unscored edges
//! - abundance: `maxAbs - |abundance|`, clamped at 0, `maxAbs` for edges
//!   without an abundance-bearing endpoint
//!
//! Where both endpoints are scored the more relevant one (lower weight) wins.

use super::candidate::MAX_SCORE;
use super::config::{round_to, MappingConfig};
use super::properties::ExperimentKey;
use crate::graph::{NodeId, PathwayGraph, PropertyValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Experiment-wide abundance statistics and the number of edges weighted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightSummary {
    pub edges: usize,
    pub max_abs_abundance: f64,
    pub max_abundance: Option<f64>,
    pub min_abundance: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeScores {
    support: Option<f64>,
    abundance: Option<f64>,
}

fn scored_nodes(graph: &PathwayGraph, key: &ExperimentKey) -> HashMap<NodeId, NodeScores> {
    let support_key = key.support_score();
    let abundance_key = key.abundance_score();
    graph
        .nodes()
        .filter(|n| n.kind.is_scorable())
        .filter_map(|n| {
            let scores = NodeScores {
                support: n.float(&support_key),
                abundance: n.float(&abundance_key),
            };
            (scores.support.is_some() || scores.abundance.is_some()).then(|| (n.id.clone(), scores))
        })
        .collect()
}

/// Min and max abundance over every scored node of the experiment
pub fn abundance_range(graph: &PathwayGraph, key: &ExperimentKey) -> Option<(f64, f64)> {
    let abundance_key = key.abundance_score();
    graph
        .nodes()
        .filter(|n| n.kind.is_scorable())
        .filter_map(|n| n.float(&abundance_key))
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Write both weight kinds onto every edge and the range onto graph metadata
pub fn derive_weights(
    graph: &mut PathwayGraph,
    key: &ExperimentKey,
    config: &MappingConfig,
) -> WeightSummary {
    let scores = scored_nodes(graph, key);
    let range = abundance_range(graph, key);
    let max_abs = range.map_or(0.0, |(lo, hi)| lo.abs().max(hi.abs()));

    let weight_support_key = key.weight_support();
    let weight_abundance_key = key.weight_abundance();

    for edge in graph.edges.iter_mut() {
        let endpoints = [scores.get(&edge.source), scores.get(&edge.target)];

        let best_support = endpoints
            .iter()
            .flatten()
            .filter_map(|s| s.support)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
        let best_magnitude = endpoints
            .iter()
            .flatten()
            .filter_map(|s| s.abundance)
            .map(f64::abs)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));

        let weight_support = match best_support {
            Some(support) => (MAX_SCORE - support).max(0.0),
            None => MAX_SCORE,
        };
        let weight_abundance = match best_magnitude {
            Some(magnitude) => (max_abs - magnitude).max(0.0),
            None => max_abs,
        };

        edge.set(
            weight_support_key.clone(),
            round_to(weight_support, config.support_precision),
        );
        edge.set(
            weight_abundance_key.clone(),
            round_to(weight_abundance, config.abundance_precision),
        );
    }

    if let Some((lo, hi)) = range {
        let props = &mut graph.metadata.properties;
        props.insert(key.abundance_max(), PropertyValue::Float(hi));
        props.insert(key.abundance_min(), PropertyValue::Float(lo));
    }
    graph.touch();

    WeightSummary {
        edges: graph.edge_count(),
        max_abs_abundance: max_abs,
        max_abundance: range.map(|(_, hi)| hi),
        min_abundance: range.map(|(lo, _)| lo),
    }
}
