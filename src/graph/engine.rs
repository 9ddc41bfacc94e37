//! GraphEngine: holds loaded pathway graphs and their backing store

use super::pathway::{GraphId, PathwayGraph};
use crate::storage::{GraphStore, StorageError};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur in graph operations
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Graph not found: {0}")]
    GraphNotFound(GraphId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// The graph engine
///
/// Manages pathway graphs in memory and, when a store is attached, keeps
/// the store as the source of truth: every write reaches the store before
/// the in-memory copy is replaced.
#[derive(Default)]
pub struct GraphEngine {
    graphs: DashMap<GraphId, PathwayGraph>,
    store: Option<Arc<dyn GraphStore>>,
}

impl std::fmt::Debug for GraphEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphEngine")
            .field("graphs", &self.graphs.len())
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl GraphEngine {
    /// Create an in-memory engine
    pub fn new() -> Self {
        Self {
            graphs: DashMap::new(),
            store: None,
        }
    }

    /// Create an engine backed by a store
    pub fn with_store(store: Arc<dyn GraphStore>) -> Self {
        Self {
            graphs: DashMap::new(),
            store: Some(store),
        }
    }

    /// Load every graph from the store into memory
    pub fn load_all(&self) -> GraphResult<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };
        let mut loaded = 0;
        for id in store.list_graphs()? {
            if let Some(graph) = store.load_graph(&id)? {
                self.graphs.insert(id, graph);
                loaded += 1;
            }
        }
        debug!(loaded, "loaded graphs from store");
        Ok(loaded)
    }

    /// Create or replace a graph
    ///
    /// The store write is a single transaction. If it fails the in-memory
    /// copy is left untouched.
    pub fn upsert_graph(&self, graph: PathwayGraph) -> GraphResult<GraphId> {
        if let Some(store) = &self.store {
            store.save_graph(&graph)?;
        }
        let id = graph.id.clone();
        self.graphs.insert(id.clone(), graph);
        Ok(id)
    }

    /// Read-modify-write one graph under its entry lock
    ///
    /// `update` runs on a working copy while the entry is write-locked, so
    /// concurrent updates of the same graph are applied one after another.
    /// The copy is persisted and then swapped in; if `update` or the store
    /// fails, both the store and the in-memory graph keep their previous
    /// state. `update` must not call back into the engine.
    pub fn update_graph<T, E, F>(&self, id: &GraphId, update: F) -> Result<T, E>
    where
        F: FnOnce(&mut PathwayGraph) -> Result<T, E>,
        E: From<GraphError>,
    {
        let mut entry = self
            .graphs
            .get_mut(id)
            .ok_or_else(|| GraphError::GraphNotFound(id.clone()))?;

        let mut working = entry.value().clone();
        let output = update(&mut working)?;
        if let Some(store) = &self.store {
            store.save_graph(&working).map_err(GraphError::from)?;
        }
        *entry = working;
        debug!(graph = %id, "graph updated");
        Ok(output)
    }

    /// Get a snapshot of a graph by ID
    pub fn get_graph(&self, id: &GraphId) -> Option<PathwayGraph> {
        self.graphs.get(id).map(|r| r.clone())
    }

    /// Remove a graph from memory and from the store
    pub fn remove_graph(&self, id: &GraphId) -> GraphResult<bool> {
        let mut removed = self.graphs.remove(id).is_some();
        if let Some(store) = &self.store {
            removed |= store.delete_graph(id)?;
        }
        Ok(removed)
    }

    /// List all graph IDs
    pub fn list_graphs(&self) -> Vec<GraphId> {
        let mut ids: Vec<GraphId> = self.graphs.iter().map(|r| r.key().clone()).collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }
}
