//! Phosphopeptide-to-proteoform mapping
//!
//! Scores measured peptides against the proteoforms of a pathway graph and
//! writes per-experiment support and abundance scores onto proteoform and
//! complex nodes, plus traversal weights onto edges.

pub mod abundance;
pub mod candidate;
pub mod complex;
pub mod config;
mod error;
pub mod input;
pub mod peptide;
mod pipeline;
pub mod properties;
mod sequence;
pub mod support;
pub mod weights;

pub use config::{AbundancePolicy, ColumnNames, ComplexAveraging, MappingConfig, SupportDenominator};
pub use error::{MappingError, MappingResult};
pub use input::{read_measurements, read_measurements_file};
pub use peptide::{localize, Localization, ModificationCall, PeptideRecord};
pub use pipeline::{list_experiments, ExperimentReport, MappingPipeline, MappingReport};
pub use properties::{experiments, ExperimentKey};
pub use sequence::ReferenceSequences;
pub use weights::{derive_weights, WeightSummary};
