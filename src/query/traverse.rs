//! Graph traversal operations

use crate::graph::{Edge, Node, NodeId, PathwayGraph};
use std::collections::{HashMap, HashSet};

/// Direction for edge traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Follow outgoing edges (source -> target)
    #[default]
    Outgoing,
    /// Follow incoming edges (target <- source)
    Incoming,
    /// Follow edges in both directions
    Both,
}

/// Nodes reached by a traversal, borrowed from the graph
///
/// Level 0 holds the origin; level N the nodes first reached after N hops.
#[derive(Debug, Clone)]
pub struct TraversalResult<'a> {
    pub origin: NodeId,
    pub levels: Vec<Vec<&'a Node>>,
}

impl<'a> TraversalResult<'a> {
    /// Every reached node except the origin, level by level
    pub fn reached(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.levels.iter().skip(1).flatten().copied()
    }
}

/// Query for traversing the graph from a starting node
#[derive(Debug, Clone)]
pub struct TraverseQuery {
    /// Starting node ID
    pub origin: NodeId,
    /// Maximum depth to traverse (None = until exhausted)
    pub max_depth: Option<usize>,
    /// Direction to traverse edges
    pub direction: Direction,
    /// Optional relationship type filter
    pub relationship: Option<String>,
}

impl TraverseQuery {
    /// Create a new traversal query from a starting node
    pub fn from(origin: NodeId) -> Self {
        Self {
            origin,
            max_depth: Some(1),
            direction: Direction::Outgoing,
            relationship: None,
        }
    }

    /// Traverse until no new nodes are reachable
    pub fn unbounded(mut self) -> Self {
        self.max_depth = None;
        self
    }

    /// Set the traversal direction
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Filter by relationship type
    pub fn with_relationship(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = Some(relationship.into());
        self
    }

    /// Execute the traversal against a graph through its adjacency index
    pub fn execute<'a>(
        &self,
        graph: &'a PathwayGraph,
        index: &AdjacencyIndex<'_>,
    ) -> TraversalResult<'a> {
        let mut result = TraversalResult {
            origin: self.origin.clone(),
            levels: Vec::new(),
        };

        let Some(origin_node) = graph.get_node(&self.origin) else {
            return result;
        };

        // BFS; the visited set also makes cycles harmless
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut current_level: Vec<NodeId> = vec![self.origin.clone()];
        visited.insert(self.origin.clone());

        result.levels.push(vec![origin_node]);

        let mut depth = 0;
        while !current_level.is_empty() && self.max_depth.map_or(true, |max| depth < max) {
            let mut next_level: Vec<NodeId> = Vec::new();
            let mut level_nodes: Vec<&'a Node> = Vec::new();

            for node_id in &current_level {
                for edge in index.incident(node_id, self.direction) {
                    if !self.edge_matches(edge) {
                        continue;
                    }

                    let neighbor_id = if &edge.source == node_id {
                        &edge.target
                    } else {
                        &edge.source
                    };

                    if visited.contains(neighbor_id) {
                        continue;
                    }

                    if let Some(neighbor) = graph.get_node(neighbor_id) {
                        visited.insert(neighbor_id.clone());
                        next_level.push(neighbor_id.clone());
                        level_nodes.push(neighbor);
                    }
                }
            }

            if !level_nodes.is_empty() {
                result.levels.push(level_nodes);
            }
            current_level = next_level;
            depth += 1;
        }

        result
    }

    fn edge_matches(&self, edge: &Edge) -> bool {
        match self.relationship {
            Some(ref rel) => &edge.relationship == rel,
            None => true,
        }
    }
}

/// Direction-aware incident-edge index over one graph
pub struct AdjacencyIndex<'a> {
    outgoing: HashMap<&'a NodeId, Vec<&'a Edge>>,
    incoming: HashMap<&'a NodeId, Vec<&'a Edge>>,
}

impl<'a> AdjacencyIndex<'a> {
    pub fn build(graph: &'a PathwayGraph) -> Self {
        let mut outgoing: HashMap<&NodeId, Vec<&Edge>> = HashMap::new();
        let mut incoming: HashMap<&NodeId, Vec<&Edge>> = HashMap::new();

        for edge in &graph.edges {
            outgoing.entry(&edge.source).or_default().push(edge);
            incoming.entry(&edge.target).or_default().push(edge);
        }

        Self { outgoing, incoming }
    }

    pub fn outgoing(&self, node_id: &NodeId) -> &[&'a Edge] {
        self.outgoing.get(node_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn incoming(&self, node_id: &NodeId) -> &[&'a Edge] {
        self.incoming.get(node_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Incident edges of a node in the given direction
    pub fn incident(&self, node_id: &NodeId, direction: Direction) -> Vec<&'a Edge> {
        match direction {
            Direction::Outgoing => self.outgoing(node_id).to_vec(),
            Direction::Incoming => self.incoming(node_id).to_vec(),
            Direction::Both => {
                let mut edges = self.outgoing(node_id).to_vec();
                edges.extend_from_slice(self.incoming(node_id));
                edges
            }
        }
    }

    /// Targets of outgoing edges with the given relationship
    pub fn targets<'s>(
        &'s self,
        node_id: &NodeId,
        relationship: &'s str,
    ) -> impl Iterator<Item = &'a NodeId> + 's {
        self.outgoing(node_id)
            .iter()
            .filter(move |e| e.relationship == relationship)
            .map(|e| &e.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{relationship, EntityKind};

    /// Complex tree: outer -> inner -> {a, b}; outer -> c; c -input-> reaction
    fn create_test_graph() -> PathwayGraph {
        let mut graph = PathwayGraph::new("test");
        for (id, kind) in [
            ("outer", EntityKind::Complex),
            ("inner", EntityKind::Complex),
            ("a", EntityKind::Proteoform),
            ("b", EntityKind::Proteoform),
            ("c", EntityKind::Proteoform),
            ("rxn", EntityKind::Reaction),
        ] {
            graph.add_node(Node::with_id(id, kind));
        }
        let edge = |s: &str, t: &str, rel: &str| Edge::new(NodeId::from(s), NodeId::from(t), rel);
        graph.add_edge(edge("outer", "inner", relationship::COMPONENT));
        graph.add_edge(edge("inner", "a", relationship::COMPONENT));
        graph.add_edge(edge("inner", "b", relationship::COMPONENT));
        graph.add_edge(edge("outer", "c", relationship::COMPONENT));
        graph.add_edge(edge("c", "rxn", relationship::INPUT));
        graph
    }

    #[test]
    fn test_traverse_depth_1() {
        let graph = create_test_graph();
        let index = AdjacencyIndex::build(&graph);
        let result = TraverseQuery::from(NodeId::from("outer")).execute(&graph, &index);

        assert_eq!(result.levels.len(), 2);
        assert_eq!(result.levels[1].len(), 2);
    }

    #[test]
    fn test_traverse_unbounded_with_relationship() {
        let graph = create_test_graph();
        let index = AdjacencyIndex::build(&graph);
        let result = TraverseQuery::from(NodeId::from("outer"))
            .unbounded()
            .with_relationship(relationship::COMPONENT)
            .execute(&graph, &index);

        let mut ids: Vec<&str> = result.reached().map(|n| n.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c", "inner"]);
    }

    #[test]
    fn test_traverse_incoming() {
        let graph = create_test_graph();
        let index = AdjacencyIndex::build(&graph);
        let result = TraverseQuery::from(NodeId::from("a"))
            .unbounded()
            .direction(Direction::Incoming)
            .execute(&graph, &index);

        let ids: Vec<&str> = result.reached().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["inner", "outer"]);
    }

    #[test]
    fn test_traverse_survives_cycle() {
        let mut graph = create_test_graph();
        graph.add_edge(Edge::new(
            NodeId::from("a"),
            NodeId::from("outer"),
            relationship::COMPONENT,
        ));
        let index = AdjacencyIndex::build(&graph);

        let result = TraverseQuery::from(NodeId::from("outer"))
            .unbounded()
            .with_relationship(relationship::COMPONENT)
            .execute(&graph, &index);
        assert_eq!(result.reached().count(), 4);
    }

    #[test]
    fn test_traverse_missing_origin() {
        let graph = create_test_graph();
        let index = AdjacencyIndex::build(&graph);
        let result = TraverseQuery::from(NodeId::from("absent")).execute(&graph, &index);
        assert!(result.levels.is_empty());
    }

    #[test]
    fn test_adjacency_incident_and_targets() {
        let graph = create_test_graph();
        let index = AdjacencyIndex::build(&graph);
        let c = NodeId::from("c");

        assert_eq!(index.incident(&c, Direction::Outgoing).len(), 1);
        assert_eq!(index.incident(&c, Direction::Incoming).len(), 1);
        assert_eq!(index.incident(&c, Direction::Both).len(), 2);

        let members: Vec<&str> = index
            .targets(&NodeId::from("inner"), relationship::COMPONENT)
            .map(|id| id.as_str())
            .collect();
        assert_eq!(members, vec!["a", "b"]);
        assert_eq!(index.targets(&c, relationship::COMPONENT).count(), 0);
    }
}
