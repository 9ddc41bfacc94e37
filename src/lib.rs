//! Proteomap: phosphopeptide mapping onto proteoform pathway graphs
//!
//! Maps quantified phosphopeptides onto a pathway knowledge graph whose
//! proteins are modelled as proteoforms (modification-state variants), and
//! turns the evidence into scores and traversal weights.
//!
//! # Core Concepts
//!
//! - **Proteoforms**: protein nodes distinguished by their modification sites
//! - **Support**: how well the measured peptides agree with a proteoform's sites
//! - **Abundance**: one representative quantity per proteoform
//! - **Weights**: per-edge costs derived from both, for minimum-weight traversals
//!
//! # Example
//!
//! ```
//! use proteomap::{GraphEngine, MappingConfig, MappingPipeline};
//!
//! let engine = GraphEngine::new();
//! let pipeline = MappingPipeline::new(MappingConfig::default());
//! assert!(engine.list_graphs().is_empty());
//! assert_eq!(pipeline.config().support_precision, 2);
//! ```

mod graph;
pub mod mapping;
pub mod query;
pub mod storage;

pub use graph::{
    relationship, Edge, EdgeId, EntityKind, GraphEngine, GraphError, GraphId, GraphMetadata,
    GraphResult, Node, NodeId, NodeMetadata, PathwayGraph, Properties, PropertyValue,
};
pub use mapping::{
    AbundancePolicy, ExperimentKey, ExperimentReport, MappingConfig, MappingError, MappingPipeline,
    MappingReport, MappingResult, PeptideRecord, ReferenceSequences,
};
pub use query::{AdjacencyIndex, Direction, FindQuery, TraversalResult, TraverseQuery};
pub use storage::{GraphStore, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
