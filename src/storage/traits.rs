//! Storage trait definitions

use crate::graph::{GraphId, PathwayGraph};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown node kind in store: {0}")]
    UnknownKind(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for graph storage backends
///
/// Implementations must be thread-safe (Send + Sync) to support
/// concurrent access from multiple threads.
pub trait GraphStore: Send + Sync {
    /// Write a whole graph (metadata, nodes, edges) as one transaction.
    ///
    /// Either every node and edge of `graph` is stored or nothing changes.
    fn save_graph(&self, graph: &PathwayGraph) -> StorageResult<()>;

    /// Load a graph by ID
    fn load_graph(&self, id: &GraphId) -> StorageResult<Option<PathwayGraph>>;

    /// Delete a graph and all its nodes/edges
    fn delete_graph(&self, id: &GraphId) -> StorageResult<bool>;

    /// List all graph IDs
    fn list_graphs(&self) -> StorageResult<Vec<GraphId>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: GraphStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
