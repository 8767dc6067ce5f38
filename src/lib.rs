//! flow-flatten
//!
//! Imports 3D assets into a scene graph and flattens the graph into one set of
//! vertex channels (positions, UVs, normals, tangents, bitangents) plus a
//! triangle index list that addresses them, ready to be copied into GPU
//! buffers.
//!
//! High-level modules
//! - `data_structures`: scene graph, imported meshes and the flattened output
//! - `flatten`: depth-first merge of every reachable mesh into one vertex numbering
//! - `resources`: glTF/OBJ importers, import post-processing and GPU buffer upload
//! - `error`: error types of the importers and the flattener
//!

pub mod data_structures;
pub mod error;
pub mod flatten;
pub mod resources;

pub use data_structures::{
    mesh::{Capabilities, Face, Mesh, TangentSpace},
    model::{FlattenedMesh, ModelVertex},
    scene_graph::{MeshId, Node, NodeId, SceneGraph},
};
pub use error::{Attribute, FlattenError, ImportError, LoadError};
pub use flatten::{flatten, flatten_into};
pub use resources::{ImportOptions, import_mesh, import_mesh_into, import_scene};

/// Initializes the platform logger: `env_logger` natively, the browser console on wasm.
pub fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::UnwrapThrowExt;
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }
}
