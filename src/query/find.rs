//! Find queries for locating nodes

use crate::graph::{EntityKind, Node, PathwayGraph};

/// Query for finding nodes by kind and property
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    /// Filter by entity kind
    pub kind: Option<EntityKind>,
    /// Filter by property key existence
    pub has_property: Option<String>,
}

impl FindQuery {
    /// Create a new empty query (matches all nodes)
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by entity kind
    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Filter by property existence
    pub fn with_property(mut self, key: impl Into<String>) -> Self {
        self.has_property = Some(key.into());
        self
    }

    /// Matching nodes, ordered by node ID
    pub fn nodes<'a>(&self, graph: &'a PathwayGraph) -> Vec<&'a Node> {
        let mut nodes: Vec<&Node> = graph.nodes.values().filter(|n| self.matches(n)).collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    fn matches(&self, node: &Node) -> bool {
        if let Some(kind) = self.kind {
            if node.kind != kind {
                return false;
            }
        }

        match self.has_property {
            Some(ref key) => node.properties.contains_key(key),
            None => true,
        }
    }
}
