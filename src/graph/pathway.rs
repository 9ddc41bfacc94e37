//! PathwayGraph: a named, proteoform-level pathway knowledge graph

use super::edge::Edge;
use super::node::{EntityKind, Node, NodeId, Properties};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a pathway graph
///
/// Serializes as a plain string (usually the graph name, e.g. "reactome-v86")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphId(String);

impl GraphId {
    /// Create a GraphId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GraphId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GraphId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Metadata about a pathway graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphMetadata {
    /// When the graph was built
    pub created_at: Option<DateTime<Utc>>,
    /// When the graph was last annotated
    pub updated_at: Option<DateTime<Utc>>,
    /// Pathway database release the graph was built from
    pub source: Option<String>,
    /// Graph-level properties (experiment-wide statistics)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: Properties,
}

/// A named pathway graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathwayGraph {
    /// Unique identifier
    pub id: GraphId,
    /// Human-readable name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Nodes in this graph
    pub nodes: HashMap<NodeId, Node>,
    /// Edges in this graph
    pub edges: Vec<Edge>,
    /// Graph metadata
    #[serde(default)]
    pub metadata: GraphMetadata,
}

impl PathwayGraph {
    /// Create a new graph; the name doubles as its ID
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_id(GraphId::from_string(name.clone()), name)
    }

    /// Create a new graph with a specific ID and name
    pub fn with_id(id: GraphId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            nodes: HashMap::new(),
            edges: Vec::new(),
            metadata: GraphMetadata {
                created_at: Some(Utc::now()),
                ..Default::default()
            },
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        self.touch();
        id
    }

    /// Add an edge to the graph
    ///
    /// An edge with the same source, target and relationship as an existing
    /// one is merged into it: properties of the new edge overwrite.
    pub fn add_edge(&mut self, edge: Edge) {
        let existing = self.edges.iter_mut().find(|e| {
            e.source == edge.source
                && e.target == edge.target
                && e.relationship == edge.relationship
        });

        match existing {
            Some(existing) => {
                for (k, v) in edge.properties {
                    existing.properties.insert(k, v);
                }
            }
            None => self.edges.push(edge),
        }
        self.touch();
    }

    /// Get a node by ID
    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a mutable reference to a node
    pub fn get_node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all nodes of one kind
    pub fn nodes_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.kind == kind)
    }

    /// Get all edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Update the last modified timestamp
    pub fn touch(&mut self) {
        self.metadata.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{relationship, PropertyValue};

    #[test]
    fn test_add_edge_exact_duplicate_merges_properties() {
        let mut graph = PathwayGraph::new("test");
        let acc = graph.add_node(Node::new(EntityKind::Accession));
        let pf = graph.add_node(Node::new(EntityKind::Proteoform));

        let mut first = Edge::new(acc.clone(), pf.clone(), relationship::BELONGS_TO);
        first.set("WEIGHT_SUPPORT_exp1", 1.5);
        graph.add_edge(first);

        let mut second = Edge::new(acc.clone(), pf.clone(), relationship::BELONGS_TO);
        second.set("WEIGHT_SUPPORT_exp1", 0.5);
        graph.add_edge(second);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.edges[0].properties.get("WEIGHT_SUPPORT_exp1"),
            Some(&PropertyValue::Float(0.5))
        );
    }

    #[test]
    fn test_add_edge_different_relationship_creates_multiple() {
        let mut graph = PathwayGraph::new("test");
        let a = graph.add_node(Node::new(EntityKind::Proteoform));
        let r = graph.add_node(Node::new(EntityKind::Reaction));

        graph.add_edge(Edge::new(a.clone(), r.clone(), relationship::INPUT));
        graph.add_edge(Edge::new(a.clone(), r.clone(), relationship::CATALYST));

        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_nodes_of_kind() {
        let mut graph = PathwayGraph::new("test");
        graph.add_node(Node::new(EntityKind::Proteoform));
        graph.add_node(Node::new(EntityKind::Proteoform));
        graph.add_node(Node::new(EntityKind::Complex));

        assert_eq!(graph.nodes_of_kind(EntityKind::Proteoform).count(), 2);
        assert_eq!(graph.nodes_of_kind(EntityKind::Complex).count(), 1);
        assert_eq!(graph.nodes_of_kind(EntityKind::Reaction).count(), 0);
    }

    #[test]
    fn test_new_graph_uses_name_as_id() {
        let graph = PathwayGraph::new("reactome");
        assert_eq!(graph.id.as_str(), "reactome");
        assert!(graph.metadata.created_at.is_some());
    }
}
