//! Merges every mesh reachable from a scene's root into one vertex/index set.
//!
//! Nodes are visited depth-first in pre-order: a node's own meshes in listed
//! order, then each child's subtree in listed order. Each mesh's faces are
//! re-based by the number of vertices emitted before it, so the resulting
//! indices address the combined arrays. Node transforms are not applied.

use crate::{
    data_structures::{
        mesh::Mesh,
        model::FlattenedMesh,
        scene_graph::SceneGraph,
    },
    error::{Attribute, FlattenError},
};

/// Flattens `scene` into a new [`FlattenedMesh`].
pub fn flatten(scene: &SceneGraph) -> Result<FlattenedMesh, FlattenError> {
    let mut flattened = FlattenedMesh::default();
    flatten_into(scene, &mut flattened)?;
    Ok(flattened)
}

/**
 * Appends the flattened `scene` to `target`.
 *
 * Indices continue after the vertices already in `target`. On error `target` is left as it was.
 */
pub fn flatten_into(scene: &SceneGraph, target: &mut FlattenedMesh) -> Result<(), FlattenError> {
    let base = target.vertex_count();
    let mut staged = FlattenedMesh::default();
    for (_, node) in scene.depth_first() {
        for &mesh_id in node.meshes() {
            let mesh = scene
                .mesh(mesh_id)
                .ok_or(FlattenError::UnknownMesh(mesh_id))?;
            append_mesh(mesh, base + staged.vertex_count(), &mut staged)?;
        }
    }
    target.append(&mut staged);
    Ok(())
}

fn append_mesh(mesh: &Mesh, offset: usize, out: &mut FlattenedMesh) -> Result<(), FlattenError> {
    let vertex_count = mesh.vertex_count();

    let caps = mesh.capabilities();
    if let Some(attribute) = caps.missing_required() {
        return Err(FlattenError::InvalidMesh {
            mesh: mesh.name.clone(),
            attribute,
        });
    }
    let normals = mesh.normals.as_deref().unwrap_or_default();
    let (tangents, bitangents) = mesh
        .tangent_space
        .as_ref()
        .map(|ts| (ts.tangents.as_slice(), ts.bitangents.as_slice()))
        .unwrap_or_default();
    let tex_coords = mesh.tex_coords.as_deref().unwrap_or_default();

    check_len(mesh, Attribute::Normals, normals.len())?;
    check_len(mesh, Attribute::TangentSpace, tangents.len())?;
    check_len(mesh, Attribute::TangentSpace, bitangents.len())?;
    if caps.tex_coords {
        check_len(mesh, Attribute::TexCoords, tex_coords.len())?;
    }

    let end = offset
        .checked_add(vertex_count)
        .ok_or(FlattenError::TooManyVertices)?;
    u32::try_from(end).map_err(|_| FlattenError::TooManyVertices)?;
    let offset = offset as u32;

    out.positions.extend_from_slice(&mesh.positions);
    out.normals.extend_from_slice(normals);
    out.tangents.extend_from_slice(tangents);
    out.bitangents.extend_from_slice(bitangents);
    if caps.tex_coords {
        out.uvs.extend_from_slice(tex_coords);
    } else {
        out.uvs
            .extend(std::iter::repeat_n(cgmath::Vector2::new(0.0, 0.0), vertex_count));
    }

    out.indices.reserve(mesh.faces.len() * 3);
    for (face_idx, face) in mesh.faces.iter().enumerate() {
        if !face.is_triangle() {
            return Err(FlattenError::NonTriangularFace {
                mesh: mesh.name.clone(),
                face: face_idx,
                len: face.indices.len(),
            });
        }
        for &index in &face.indices {
            if index as usize >= vertex_count {
                return Err(FlattenError::IndexOutOfRange {
                    mesh: mesh.name.clone(),
                    face: face_idx,
                    index,
                    vertex_count,
                });
            }
            out.indices.push(index + offset);
        }
    }

    log::trace!(
        "flattened mesh '{}': {} vertices, {} faces at offset {}",
        mesh.name,
        vertex_count,
        mesh.faces.len(),
        offset
    );
    Ok(())
}

fn check_len(mesh: &Mesh, attribute: Attribute, len: usize) -> Result<(), FlattenError> {
    if len != mesh.vertex_count() {
        return Err(FlattenError::AttributeLength {
            mesh: mesh.name.clone(),
            attribute,
            len,
            vertex_count: mesh.vertex_count(),
        });
    }
    Ok(())
}
