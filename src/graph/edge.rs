//! Edge representation

use super::node::{NodeId, Properties, PropertyValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for an edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Create a new random EdgeId
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Create an EdgeId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relationship types written by the graph-build step
pub mod relationship {
    /// Accession -> Proteoform
    pub const BELONGS_TO: &str = "belongs_to";
    /// Proteoform -> ModificationSite
    pub const HAS_MODIFICATION: &str = "has_modification";
    /// Complex -> member (Proteoform or Complex)
    pub const COMPONENT: &str = "component";
    /// Participant -> Reaction
    pub const INPUT: &str = "input";
    /// Reaction -> Participant
    pub const OUTPUT: &str = "output";
    /// Catalyst -> Reaction
    pub const CATALYST: &str = "catalyst";
}

/// A directed edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier
    pub id: EdgeId,
    /// Source node
    pub source: NodeId,
    /// Target node
    pub target: NodeId,
    /// Type of relationship (see [`relationship`])
    pub relationship: String,
    /// When the edge was created
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Additional properties (traversal weights live here)
    #[serde(default)]
    pub properties: Properties,
}

impl Edge {
    /// Create a new edge
    pub fn new(source: NodeId, target: NodeId, relationship: impl Into<String>) -> Self {
        Self {
            id: EdgeId::new(),
            source,
            target,
            relationship: relationship.into(),
            created_at: Utc::now(),
            properties: HashMap::new(),
        }
    }

    /// Whether the given node is one of the endpoints
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(PropertyValue::as_f64)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }
}
