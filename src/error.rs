//! Error types returned by the importers and the flattener.

use crate::data_structures::scene_graph::MeshId;

/// A per-vertex channel the flattener needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Normals,
    TexCoords,
    TangentSpace,
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Attribute::Normals => "normals",
            Attribute::TexCoords => "texture coordinates",
            Attribute::TangentSpace => "tangents/bitangents",
        };
        f.write_str(name)
    }
}

/// The scene graph broke one of the importer's guarantees.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FlattenError {
    #[error("mesh '{mesh}' has no {attribute}")]
    InvalidMesh { mesh: String, attribute: Attribute },

    #[error("mesh '{mesh}' has {len} {attribute} for {vertex_count} vertices")]
    AttributeLength {
        mesh: String,
        attribute: Attribute,
        len: usize,
        vertex_count: usize,
    },

    #[error("face {face} of mesh '{mesh}' has {len} indices, expected 3")]
    NonTriangularFace { mesh: String, face: usize, len: usize },

    #[error("face {face} of mesh '{mesh}' references vertex {index} but the mesh has {vertex_count}")]
    IndexOutOfRange {
        mesh: String,
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("node references mesh {0} which is not part of the scene")]
    UnknownMesh(MeshId),

    #[error("combined vertex count exceeds the u32 index range")]
    TooManyVertices,
}

impl FlattenError {
    /// True for errors caused by a mesh that lacks or mis-sizes a channel.
    pub fn is_invalid_mesh(&self) -> bool {
        matches!(
            self,
            FlattenError::InvalidMesh { .. } | FlattenError::AttributeLength { .. }
        )
    }
}

/// The import collaborator couldn't produce a scene graph.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("couldn't read {path}: {source}")]
    Read { path: String, source: anyhow::Error },

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("glTF loading error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("OBJ loading error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("glTF buffer {0} has no data")]
    MissingBuffer(usize),

    #[error("glTF buffer {0} is an embedded data URI, which is not supported")]
    EmbeddedBuffer(usize),

    #[error("file contains no scene")]
    NoScene,
}

/// Either step of [`crate::resources::import_mesh`] failed.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("invalid mesh: {0}")]
    Flatten(#[from] FlattenError),
}
