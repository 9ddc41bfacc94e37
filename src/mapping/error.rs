//! Errors raised by the mapping core
//!
//! Only configuration problems and store failures are errors. Gaps in the
//! measured data (unlocatable peptides, unknown accessions, missing values)
//! are tallied in the report instead.

use crate::graph::{GraphError, GraphId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error(
        "Unknown abundance policy '{0}' (expected highest_support, max, mean, median or extreme)"
    )]
    UnknownPolicy(String),

    #[error("Unknown support denominator '{0}' (expected all_peptides or localized_peptides)")]
    UnknownDenominator(String),

    #[error("Unknown complex averaging '{0}' (expected all_members or scored_members)")]
    UnknownAveraging(String),

    #[error("Experiment not found: {0}")]
    ExperimentNotFound(String),

    #[error("Input column not found: {0}")]
    MissingColumn(String),

    #[error("Experiments '{first}' and '{second}' both map to property suffix '{suffix}'")]
    ExperimentLabelClash {
        first: String,
        second: String,
        suffix: String,
    },

    #[error("Graph not found: {0}")]
    GraphNotFound(GraphId),

    #[error("Graph error: {0}")]
    Graph(GraphError),

    #[error("Input error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MappingError {
    /// Whether the error is a configuration problem detected before any write
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MappingError::UnknownPolicy(_)
                | MappingError::UnknownDenominator(_)
                | MappingError::UnknownAveraging(_)
                | MappingError::ExperimentNotFound(_)
                | MappingError::ExperimentLabelClash { .. }
                | MappingError::MissingColumn(_)
                | MappingError::GraphNotFound(_)
                | MappingError::Yaml(_)
        )
    }
}

impl From<GraphError> for MappingError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::GraphNotFound(id) => MappingError::GraphNotFound(id),
            other => MappingError::Graph(other),
        }
    }
}

pub type MappingResult<T> = Result<T, MappingError>;
