//! Experiment-scoped property names
//!
//! Scores live on nodes and edges as plain properties suffixed with the
//! experiment label. Downstream consumers read these exact names.

use crate::graph::PathwayGraph;
use std::collections::BTreeSet;

pub const SUPPORT_SCORE: &str = "SUPPORT_SCORE";
pub const ABUNDANCE_SCORE: &str = "ABUNDANCE_SCORE";
pub const SCORED_BY: &str = "SCORED_BY";
pub const MAPPED: &str = "MAPPED";
pub const WEIGHT_SUPPORT: &str = "WEIGHT_SUPPORT";
pub const WEIGHT_ABUNDANCE: &str = "WEIGHT_ABUNDANCE";
pub const ABUNDANCE_MAX: &str = "ABUNDANCE_MAX";
pub const ABUNDANCE_MIN: &str = "ABUNDANCE_MIN";

const ALL_PREFIXES: [&str; 8] = [
    SUPPORT_SCORE,
    ABUNDANCE_SCORE,
    SCORED_BY,
    MAPPED,
    WEIGHT_SUPPORT,
    WEIGHT_ABUNDANCE,
    ABUNDANCE_MAX,
    ABUNDANCE_MIN,
];

/// Replace every character outside `[A-Za-z0-9_]` with `_`
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// An experiment label and the property names derived from it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExperimentKey {
    label: String,
    suffix: String,
}

impl ExperimentKey {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let suffix = sanitize_label(&label);
        Self { label, suffix }
    }

    /// The label as it appeared in the input
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The label as it appears in property names
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    fn name(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.suffix)
    }

    pub fn support_score(&self) -> String {
        self.name(SUPPORT_SCORE)
    }

    pub fn abundance_score(&self) -> String {
        self.name(ABUNDANCE_SCORE)
    }

    pub fn scored_by(&self) -> String {
        self.name(SCORED_BY)
    }

    pub fn mapped(&self) -> String {
        self.name(MAPPED)
    }

    pub fn weight_support(&self) -> String {
        self.name(WEIGHT_SUPPORT)
    }

    pub fn weight_abundance(&self) -> String {
        self.name(WEIGHT_ABUNDANCE)
    }

    pub fn abundance_max(&self) -> String {
        self.name(ABUNDANCE_MAX)
    }

    pub fn abundance_min(&self) -> String {
        self.name(ABUNDANCE_MIN)
    }

    /// Whether a property key belongs to this experiment
    ///
    /// Exact match only: "exp1" does not own "SUPPORT_SCORE_exp10".
    pub fn owns(&self, key: &str) -> bool {
        ALL_PREFIXES.iter().any(|prefix| {
            key.strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('_'))
                .is_some_and(|rest| rest == self.suffix)
        })
    }

    /// Remove every property of this experiment from nodes, edges and graph metadata
    ///
    /// Returns the number of properties removed.
    pub fn clear(&self, graph: &mut PathwayGraph) -> usize {
        let mut removed = 0;
        for node in graph.nodes.values_mut() {
            removed += node.remove_where(|k| self.owns(k));
        }
        for edge in graph.edges.iter_mut() {
            let before = edge.properties.len();
            edge.properties.retain(|k, _| !self.owns(k));
            removed += before - edge.properties.len();
        }
        let before = graph.metadata.properties.len();
        graph.metadata.properties.retain(|k, _| !self.owns(k));
        removed += before - graph.metadata.properties.len();
        removed
    }
}

impl std::fmt::Display for ExperimentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Experiments for which any scorable node carries a support score
///
/// Returned as property suffixes, sorted.
pub fn experiments(graph: &PathwayGraph) -> Vec<String> {
    let prefix = format!("{}_", SUPPORT_SCORE);
    let found: BTreeSet<String> = graph
        .nodes()
        .filter(|n| n.kind.is_scorable())
        .flat_map(|n| n.properties.keys())
        .filter_map(|k| k.strip_prefix(&prefix))
        .map(str::to_string)
        .collect();
    found.into_iter().collect()
}

/// Whether any node carries a support score for the experiment
pub fn has_experiment(graph: &PathwayGraph, key: &ExperimentKey) -> bool {
    let name = key.support_score();
    graph
        .nodes()
        .any(|n| n.kind.is_scorable() && n.properties.contains_key(&name))
}
