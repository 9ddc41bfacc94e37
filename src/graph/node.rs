//! Node representation in the pathway graph

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a node
///
/// Serializes as a plain string (e.g. "proteoform:R-HSA-74711")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new random NodeId
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Create a NodeId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Entity subtype of a node.
///
/// Closed set: every stage of the mapping core matches on this instead of
/// inspecting label strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Stable protein identifier (UniProt accession)
    Accession,
    /// Protein at a location with a specific set of modification sites
    Proteoform,
    /// One modification site attached to a proteoform
    ModificationSite,
    /// Assembly of proteoforms and/or other complexes
    Complex,
    /// Any other physical entity (small molecule, polymer, ...)
    PhysicalEntity,
    /// Reaction or interaction linking participants
    Reaction,
}

impl EntityKind {
    /// Label used by the store's node index
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Accession => "accession",
            EntityKind::Proteoform => "proteoform",
            EntityKind::ModificationSite => "modification_site",
            EntityKind::Complex => "complex",
            EntityKind::PhysicalEntity => "physical_entity",
            EntityKind::Reaction => "reaction",
        }
    }

    /// Parse a store label back into a kind
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "accession" => Some(EntityKind::Accession),
            "proteoform" => Some(EntityKind::Proteoform),
            "modification_site" => Some(EntityKind::ModificationSite),
            "complex" => Some(EntityKind::Complex),
            "physical_entity" => Some(EntityKind::PhysicalEntity),
            "reaction" => Some(EntityKind::Reaction),
            _ => None,
        }
    }

    /// Whether mapping scores may be stored on this kind
    pub fn is_scorable(&self) -> bool {
        matches!(self, EntityKind::Proteoform | EntityKind::Complex)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Typed property values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<PropertyValue>),
    Object(HashMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Numeric view; integers widen to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

/// Properties collection
pub type Properties = HashMap<String, PropertyValue>;

/// Node metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// When the node was created
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    /// When the node's properties were last annotated
    pub modified_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Source record (e.g. pathway database stable id)
    pub source: Option<String>,
}

/// A node in the pathway graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,
    /// Entity subtype
    pub kind: EntityKind,
    /// Domain-specific properties
    #[serde(default)]
    pub properties: Properties,
    /// Node metadata
    #[serde(default)]
    pub metadata: NodeMetadata,
}

impl Node {
    /// Create a new node of the given kind
    pub fn new(kind: EntityKind) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            properties: HashMap::new(),
            metadata: NodeMetadata {
                created_at: Some(chrono::Utc::now()),
                ..Default::default()
            },
        }
    }

    /// Create a new node with a fixed ID
    pub fn with_id(id: impl Into<NodeId>, kind: EntityKind) -> Self {
        let mut node = Self::new(kind);
        node.id = id.into();
        node
    }

    /// Add a property to the node
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Set the source record
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = Some(source.into());
        self
    }

    /// Display name, falling back to the ID
    pub fn name(&self) -> &str {
        self.string("name").unwrap_or(self.id.as_str())
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(PropertyValue::as_str)
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(PropertyValue::as_f64)
    }

    /// Set a property and stamp the modification time
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
        self.metadata.modified_at = Some(chrono::Utc::now());
    }

    /// Remove every property whose key satisfies the predicate
    pub fn remove_where(&mut self, predicate: impl Fn(&str) -> bool) -> usize {
        let before = self.properties.len();
        self.properties.retain(|k, _| !predicate(k));
        before - self.properties.len()
    }
}
