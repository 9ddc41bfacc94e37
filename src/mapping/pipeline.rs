//! Mapping pipeline
//!
//! Per experiment, leaves first:
//!
//! 1. localize every record against its reference sequence
//! 2. score records against each accession's proteoforms (parallel per accession)
//! 3. resolve aliasing accessions on the [`ScoreBoard`] and write node scores
//! 4. propagate scores to complexes
//! 5. derive edge weights
//!
//! All stages run on a working copy inside `GraphEngine::update_graph`, which
//! holds the graph's entry lock until the copy is persisted in one store
//! transaction and swapped in.

use super::abundance::{aggregate, Measured};
use super::candidate::{collect_candidates, ProteoformCandidate};
use super::complex::propagate_complexes;
use super::config::{round_to, AbundancePolicy, MappingConfig};
use super::error::{MappingError, MappingResult};
use super::peptide::PeptideRecord;
use super::properties::{experiments, has_experiment, ExperimentKey};
use super::sequence::ReferenceSequences;
use super::support::{support_score, ScoreBoard, ScoreMatrix};
use super::weights::{derive_weights, WeightSummary};
use crate::graph::{EntityKind, GraphEngine, GraphId, NodeId, PathwayGraph};
use crate::query::{AdjacencyIndex, FindQuery};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Tallies for one experiment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub experiment: String,
    /// Records after protein groups were split per accession
    pub peptides: usize,
    pub localized: usize,
    pub unlocalized: usize,
    pub without_value: usize,
    pub accessions: usize,
    pub accessions_not_in_graph: usize,
    pub accessions_without_localized: usize,
    pub proteoforms_scored: usize,
    pub complexes_scored: usize,
    pub edges_weighted: usize,
    pub max_abundance: Option<f64>,
    pub min_abundance: Option<f64>,
}

/// Result of one mapping run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingReport {
    pub graph: GraphId,
    pub policy: AbundancePolicy,
    pub experiments: Vec<ExperimentReport>,
}

impl MappingReport {
    pub fn experiment(&self, label: &str) -> Option<&ExperimentReport> {
        self.experiments.iter().find(|e| e.experiment == label)
    }
}

/// Scores one accession offers to one of its proteoforms
#[derive(Debug, Clone)]
struct Offer {
    node_id: NodeId,
    support: f64,
    abundance: Option<f64>,
}

#[derive(Debug)]
enum AccessionOutcome {
    NotInGraph,
    NoLocalized,
    Scored(Vec<Offer>),
}

/// Runs mapping for a set of experiments against one graph
#[derive(Debug, Clone, Default)]
pub struct MappingPipeline {
    config: MappingConfig,
}

impl MappingPipeline {
    pub fn new(config: MappingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Map records onto a graph held by the engine and commit the result
    ///
    /// Nothing is written when any error occurs. Runs against the same graph
    /// are applied one after another.
    pub fn run(
        &self,
        engine: &GraphEngine,
        graph_id: &GraphId,
        records: Vec<PeptideRecord>,
        references: &ReferenceSequences,
    ) -> MappingResult<MappingReport> {
        let report = engine.update_graph(graph_id, |graph| {
            self.map_graph(graph, records, references)
        })?;

        info!(graph = %graph_id, experiments = report.experiments.len(), "Mapping committed");
        Ok(report)
    }

    /// Map records onto a graph in place
    pub fn map_graph(
        &self,
        graph: &mut PathwayGraph,
        records: Vec<PeptideRecord>,
        references: &ReferenceSequences,
    ) -> MappingResult<MappingReport> {
        let mut by_experiment: BTreeMap<String, Vec<PeptideRecord>> = BTreeMap::new();
        for record in records {
            by_experiment.entry(record.experiment.clone()).or_default().push(record);
        }

        if let Some(ref requested) = self.config.experiments {
            let missing = requested.iter().find(|label| !by_experiment.contains_key(*label));
            if let Some(missing) = missing {
                return Err(MappingError::ExperimentNotFound(missing.clone()));
            }
            by_experiment.retain(|label, _| requested.contains(label));
        }
        check_suffixes(by_experiment.keys())?;

        let mut reports = Vec::with_capacity(by_experiment.len());
        for (label, mut records) in by_experiment {
            records.par_iter_mut().for_each(|r| {
                r.localize_with(references);
            });
            let key = ExperimentKey::new(label);
            reports.push(self.map_experiment(graph, &key, &records));
        }

        Ok(MappingReport {
            graph: graph.id.clone(),
            policy: self.config.abundance_policy,
            experiments: reports,
        })
    }

    fn map_experiment(
        &self,
        graph: &mut PathwayGraph,
        key: &ExperimentKey,
        records: &[PeptideRecord],
    ) -> ExperimentReport {
        let mut report = ExperimentReport {
            experiment: key.label().to_string(),
            peptides: records.len(),
            localized: records.iter().filter(|r| r.is_localized()).count(),
            without_value: records.iter().filter(|r| r.value.is_none()).count(),
            ..Default::default()
        };
        report.unlocalized = report.peptides - report.localized;

        let removed = key.clear(graph);
        if removed > 0 {
            debug!(experiment = %key, removed, "Cleared previous results");
        }

        let mut by_accession: BTreeMap<&str, Vec<&PeptideRecord>> = BTreeMap::new();
        for record in records {
            by_accession.entry(record.accession.as_str()).or_default().push(record);
        }
        report.accessions = by_accession.len();

        let board = ScoreBoard::new();
        {
            let view: &PathwayGraph = graph;
            let index = AdjacencyIndex::build(view);
            let lookup = FindQuery::new()
                .with_kind(EntityKind::Accession)
                .with_property("accession");
            let mut accession_nodes: HashMap<&str, Vec<&NodeId>> = HashMap::new();
            for node in lookup.nodes(view) {
                if let Some(accession) = node.string("accession") {
                    accession_nodes.entry(accession).or_default().push(&node.id);
                }
            }

            let outcomes: Vec<(&str, AccessionOutcome)> = by_accession
                .par_iter()
                .map(|(&accession, records)| {
                    let outcome = match accession_nodes.get(accession) {
                        Some(nodes) => {
                            if nodes.len() > 1 {
                                warn!(
                                    accession,
                                    nodes = nodes.len(),
                                    "Accession carried by several nodes, scoring all of them"
                                );
                            }
                            self.score_accession(view, &index, nodes, records)
                        }
                        None => AccessionOutcome::NotInGraph,
                    };
                    (accession, outcome)
                })
                .collect();

            outcomes.par_iter().for_each(|(accession, outcome)| {
                if let AccessionOutcome::Scored(offers) = outcome {
                    for offer in offers {
                        board.offer_support(&offer.node_id, accession, offer.support);
                        if let Some(abundance) = offer.abundance {
                            board.offer_abundance(&offer.node_id, accession, abundance);
                        }
                    }
                }
            });

            for (accession, outcome) in &outcomes {
                match outcome {
                    AccessionOutcome::NotInGraph => {
                        report.accessions_not_in_graph += 1;
                        debug!(accession, "Accession not in graph");
                    }
                    AccessionOutcome::NoLocalized => {
                        report.accessions_without_localized += 1;
                        debug!(accession, "No localized peptides");
                    }
                    AccessionOutcome::Scored(_) => {}
                }
            }
        }

        report.proteoforms_scored = board.len();
        for (node_id, score) in board.into_sorted() {
            let Some(node) = graph.get_node_mut(&node_id) else {
                continue;
            };
            node.set(key.mapped(), score.mapped_label());
            if let Some(support) = score.support {
                node.set(key.support_score(), support.value);
                node.set(key.scored_by(), support.accession);
            }
            if let Some(abundance) = score.abundance {
                node.set(key.abundance_score(), abundance.value);
            }
        }

        let complexes = propagate_complexes(graph, key, &self.config);
        report.complexes_scored = complexes.len();
        for complex in complexes {
            let Some(node) = graph.get_node_mut(&complex.node_id) else {
                continue;
            };
            node.set(key.support_score(), complex.support);
            if let Some(abundance) = complex.abundance {
                node.set(key.abundance_score(), abundance);
            }
            node.set(key.mapped(), complex.mapped_label());
        }

        let weights = derive_weights(graph, key, &self.config);
        report.edges_weighted = weights.edges;
        report.max_abundance = weights.max_abundance;
        report.min_abundance = weights.min_abundance;

        if report.localized == 0 {
            warn!(experiment = %key, peptides = report.peptides, "No peptide could be localized");
        }
        info!(
            experiment = %key,
            peptides = report.peptides,
            localized = report.localized,
            accessions = report.accessions,
            not_in_graph = report.accessions_not_in_graph,
            proteoforms = report.proteoforms_scored,
            complexes = report.complexes_scored,
            "Experiment mapped"
        );

        report
    }

    fn score_accession(
        &self,
        graph: &PathwayGraph,
        index: &AdjacencyIndex<'_>,
        accession_nodes: &[&NodeId],
        records: &[&PeptideRecord],
    ) -> AccessionOutcome {
        let localized = records.iter().filter(|r| r.is_localized()).count();
        if localized == 0 {
            return AccessionOutcome::NoLocalized;
        }

        let mut candidates: Vec<ProteoformCandidate> = accession_nodes
            .iter()
            .flat_map(|node| collect_candidates(graph, index, node))
            .collect();
        candidates.sort_by(|a, b| a.node_id.cmp(&b.node_id));
        candidates.dedup_by(|a, b| a.node_id == b.node_id);
        let matrix = ScoreMatrix::build(records, &candidates);

        let denominator = self.config.support_denominator;
        let mut offers = Vec::with_capacity(candidates.len());
        for (i, candidate) in candidates.iter().enumerate() {
            let row = matrix.row(i);
            let Some(support) = support_score(row, records.len(), localized, denominator) else {
                continue;
            };

            let measured: Vec<Measured> = records
                .iter()
                .zip(row)
                .filter(|(r, _)| r.is_localized())
                .filter_map(|(r, &score)| r.value.map(|value| Measured { value, score }))
                .collect();
            let abundance = aggregate(self.config.abundance_policy, &measured)
                .map(|a| round_to(a, self.config.abundance_precision));

            offers.push(Offer {
                node_id: candidate.node_id.clone(),
                support: round_to(support, self.config.support_precision),
                abundance,
            });
        }

        AccessionOutcome::Scored(offers)
    }

    /// Recompute edge weights from stored scores and commit
    pub fn rederive_weights(
        &self,
        engine: &GraphEngine,
        graph_id: &GraphId,
        experiment: &str,
    ) -> MappingResult<WeightSummary> {
        let key = ExperimentKey::new(experiment);
        let summary = engine.update_graph(graph_id, |graph| {
            if !has_experiment(graph, &key) {
                return Err(MappingError::ExperimentNotFound(experiment.to_string()));
            }
            Ok(derive_weights(graph, &key, &self.config))
        })?;

        info!(graph = %graph_id, experiment, edges = summary.edges, "Weights re-derived");
        Ok(summary)
    }
}

/// Reject experiment labels that would share property names
fn check_suffixes<'a>(labels: impl Iterator<Item = &'a String>) -> MappingResult<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for label in labels {
        let key = ExperimentKey::new(label.as_str());
        if let Some(first) = seen.insert(key.suffix().to_string(), label) {
            return Err(MappingError::ExperimentLabelClash {
                first: first.to_string(),
                second: label.clone(),
                suffix: key.suffix().to_string(),
            });
        }
    }
    Ok(())
}

/// Experiments with stored support scores on a graph held by the engine
pub fn list_experiments(engine: &GraphEngine, graph_id: &GraphId) -> MappingResult<Vec<String>> {
    let graph = engine
        .get_graph(graph_id)
        .ok_or_else(|| MappingError::GraphNotFound(graph_id.clone()))?;
    Ok(experiments(&graph))
}
