//! Data structures shared by the importers and the flattener.
//!
//! - `scene_graph` holds the imported node tree and the mesh table it references
//! - `mesh` holds a single imported mesh with its optional attribute channels
//! - `model` holds the flattened output and the interleaved GPU vertex

pub mod mesh;
pub mod model;
pub mod scene_graph;
