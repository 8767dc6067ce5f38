//! Flattened geometry ready to be copied into GPU buffers.

use cgmath::{Vector2, Vector3};

/// Every mesh of a scene merged into one vertex numbering.
///
/// The five vertex channels always have the same length and every entry of
/// `indices` addresses them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlattenedMesh {
    pub positions: Vec<Vector3<f32>>,
    pub uvs: Vec<Vector2<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub tangents: Vec<Vector3<f32>>,
    pub bitangents: Vec<Vector3<f32>>,
    pub indices: Vec<u32>,
}

impl FlattenedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.indices.is_empty()
    }

    pub(crate) fn append(&mut self, other: &mut FlattenedMesh) {
        self.positions.append(&mut other.positions);
        self.uvs.append(&mut other.uvs);
        self.normals.append(&mut other.normals);
        self.tangents.append(&mut other.tangents);
        self.bitangents.append(&mut other.bitangents);
        self.indices.append(&mut other.indices);
    }

    /// Interleaves the channels into one vertex per entry, in vertex order.
    pub fn vertices(&self) -> Vec<ModelVertex> {
        (0..self.vertex_count())
            .map(|i| ModelVertex {
                position: self.positions[i].into(),
                tex_coords: self.uvs[i].into(),
                normal: self.normals[i].into(),
                tangent: self.tangents[i].into(),
                bitangent: self.bitangents[i].into(),
            })
            .collect()
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl ModelVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x2,
        2 => Float32x3,
        3 => Float32x3,
        4 => Float32x3
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
