//! Core graph data structures

mod edge;
mod engine;
mod node;
mod pathway;


pub use edge::{relationship, Edge, EdgeId};
pub use engine::{GraphEngine, GraphError, GraphResult};
pub use node::{EntityKind, Node, NodeId, NodeMetadata, Properties, PropertyValue};
pub use pathway::{GraphId, GraphMetadata, PathwayGraph};
