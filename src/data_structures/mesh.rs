//! Imported mesh data as the scene graph stores it.
//!
//! A mesh keeps one `Vec` per vertex attribute. Positions and faces are
//! always present, every other channel is optional and its presence is
//! reported through [`Capabilities`].

use cgmath::{Vector2, Vector3};

use crate::error::Attribute;

/// Per-vertex tangents and bitangents used for normal mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TangentSpace {
    pub tangents: Vec<Vector3<f32>>,
    pub bitangents: Vec<Vector3<f32>>,
}

/// A polygon given as mesh-local vertex indices.
///
/// Importers triangulate, so a well-formed face has exactly three indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Face {
    pub indices: Vec<u32>,
}

impl Face {
    pub fn triangle(a: u32, b: u32, c: u32) -> Self {
        Self {
            indices: vec![a, b, c],
        }
    }

    pub fn is_triangle(&self) -> bool {
        self.indices.len() == 3
    }
}

impl From<[u32; 3]> for Face {
    fn from(indices: [u32; 3]) -> Self {
        Self {
            indices: indices.to_vec(),
        }
    }
}

/// Which optional attribute channels a mesh carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub normals: bool,
    pub tex_coords: bool,
    pub tangent_space: bool,
}

impl Capabilities {
    /// First channel flattening needs that is absent. Texture coordinates are optional.
    pub fn missing_required(&self) -> Option<Attribute> {
        if !self.normals {
            Some(Attribute::Normals)
        } else if !self.tangent_space {
            Some(Attribute::TangentSpace)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vector3<f32>>,
    pub normals: Option<Vec<Vector3<f32>>>,
    /// First UV set only. Additional sets are never imported.
    pub tex_coords: Option<Vec<Vector2<f32>>>,
    pub tangent_space: Option<TangentSpace>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, positions: Vec<Vector3<f32>>, faces: Vec<Face>) -> Self {
        Self {
            name: name.into(),
            positions,
            faces,
            ..Default::default()
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vector3<f32>>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_tex_coords(mut self, tex_coords: Vec<Vector2<f32>>) -> Self {
        self.tex_coords = Some(tex_coords);
        self
    }

    pub fn with_tangent_space(
        mut self,
        tangents: Vec<Vector3<f32>>,
        bitangents: Vec<Vector3<f32>>,
    ) -> Self {
        self.tangent_space = Some(TangentSpace {
            tangents,
            bitangents,
        });
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            normals: self.normals.is_some(),
            tex_coords: self.tex_coords.is_some(),
            tangent_space: self.tangent_space.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        Mesh::new("tri", vec![Vector3::new(0.0, 0.0, 0.0); 3], vec![Face::triangle(0, 1, 2)])
    }

    #[test]
    fn capabilities_follow_present_channels() {
        let bare = triangle();
        assert_eq!(bare.capabilities(), Capabilities::default());
        assert_eq!(bare.capabilities().missing_required(), Some(Attribute::Normals));

        let lit = triangle().with_normals(vec![Vector3::unit_z(); 3]);
        assert_eq!(
            lit.capabilities().missing_required(),
            Some(Attribute::TangentSpace)
        );

        let full = lit.with_tangent_space(vec![Vector3::unit_x(); 3], vec![Vector3::unit_y(); 3]);
        let caps = full.capabilities();
        assert!(caps.normals && caps.tangent_space && !caps.tex_coords);
        assert_eq!(caps.missing_required(), None);
    }
}
