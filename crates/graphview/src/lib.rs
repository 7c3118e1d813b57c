//! Mind-map document store: nodes, edges, generations and the editing
//! actions that keep connector handles consistent with node geometry.

pub mod associations;
pub mod edge;
pub mod error;
pub mod generation;
pub mod graph;
pub mod node;

pub use associations::{
    AssociationWord, GenerationResult, GenerationalResponse, ResponseStatus,
};
pub use edge::{MindMapEdge, RawEdge, edge_id};
pub use error::GraphError;
pub use generation::{
    FALLBACK_COLOR, GENERATION_PALETTE, GenerationCount, GenerationFilter, generation_color,
};
pub use graph::MindMap;
pub use node::{MindMapNode, NodeData};
