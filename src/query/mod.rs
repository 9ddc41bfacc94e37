//! Query system for pathway graphs
//!
//! Provides kind/property node filters, direction-aware incident edge
//! iteration, and breadth-first traversal.

mod find;
mod traverse;

pub use find::FindQuery;
pub use traverse::{AdjacencyIndex, Direction, TraversalResult, TraverseQuery};
