use std::collections::HashMap;

use cgmath::{InnerSpace, Vector3, Zero};

use crate::data_structures::mesh::{Face, Mesh, TangentSpace};

/**
 * Neither OBJ files nor most glTF files come with tangents and bitangents so they have to be
 * calculated for normal maps to work correctly.
 *
 * Tangents are taken from the UV gradients of every triangle a vertex belongs to and averaged.
 * Vertices that no usable triangle touches (no UVs, or only degenerate UV triangles) get an
 * arbitrary basis perpendicular to their normal instead. Needs normals; returns `None` without.
 */
pub fn calc_tangent_space(mesh: &Mesh) -> Option<TangentSpace> {
    let normals = mesh.normals.as_ref()?;
    let vertex_count = mesh.vertex_count();
    if normals.len() != vertex_count {
        return None;
    }

    let mut tangents = vec![Vector3::zero(); vertex_count];
    let mut bitangents = vec![Vector3::zero(); vertex_count];
    let mut triangles_included = vec![0u32; vertex_count];

    if let Some(tex_coords) = mesh.tex_coords.as_ref().filter(|uv| uv.len() == vertex_count) {
        for face in mesh.faces.iter().filter(|face| face.is_triangle()) {
            let c: Vec<usize> = face.indices.iter().map(|&i| i as usize).collect();
            if c.iter().any(|&i| i >= vertex_count) {
                continue;
            }
            let pos0 = mesh.positions[c[0]];
            let pos1 = mesh.positions[c[1]];
            let pos2 = mesh.positions[c[2]];

            let uv0 = tex_coords[c[0]];
            let uv1 = tex_coords[c[1]];
            let uv2 = tex_coords[c[2]];

            // Calculate the edges of the triangle
            let delta_pos1 = pos1 - pos0;
            let delta_pos2 = pos2 - pos0;

            // This will give us a direction to calculate the
            // tangent and bitangent
            let delta_uv1 = uv1 - uv0;
            let delta_uv2 = uv2 - uv0;

            // Solving the following system of equations will
            // give us the tangent and bitangent.
            //     delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
            //     delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
            let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
            if det.abs() <= f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
            let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * r;

            // We'll use the same tangent/bitangent for each vertex in the triangle
            for &i in &c {
                tangents[i] += tangent;
                bitangents[i] += bitangent;
                // Used to average the tangents/bitangents
                triangles_included[i] += 1;
            }
        }
    }

    // Average the tangents/bitangents
    for (i, n) in triangles_included.into_iter().enumerate() {
        if n == 0 {
            let (tangent, bitangent) = basis_from_normal(normals[i]);
            tangents[i] = tangent;
            bitangents[i] = bitangent;
        } else {
            let denom = 1.0 / n as f32;
            tangents[i] *= denom;
            bitangents[i] *= denom;
        }
    }

    Some(TangentSpace {
        tangents,
        bitangents,
    })
}

fn basis_from_normal(normal: Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    if normal.magnitude2() <= f32::EPSILON {
        return (Vector3::zero(), Vector3::zero());
    }
    let normal = normal.normalize();
    let helper = if normal.x.abs() < 0.9 {
        Vector3::unit_x()
    } else {
        Vector3::unit_y()
    };
    let tangent = (helper - normal * normal.dot(helper)).normalize();
    (tangent, normal.cross(tangent))
}

/**
 * Merges vertices whose attributes are bit-for-bit identical and rewrites the faces to match.
 *
 * Vertices keep the order of their first occurrence.
 */
pub fn join_identical_vertices(mesh: &mut Mesh) {
    let vertex_count = mesh.vertex_count();
    let channels_match = mesh.normals.as_ref().is_none_or(|n| n.len() == vertex_count)
        && mesh.tex_coords.as_ref().is_none_or(|uv| uv.len() == vertex_count)
        && mesh.tangent_space.as_ref().is_none_or(|ts| {
            ts.tangents.len() == vertex_count && ts.bitangents.len() == vertex_count
        });
    if !channels_match {
        log::warn!(
            "Mesh '{}' has channels of different lengths, not joining its vertices.",
            mesh.name
        );
        return;
    }

    let mut seen: HashMap<Vec<u32>, u32> = HashMap::new();
    let mut remap = Vec::with_capacity(vertex_count);
    let mut kept = Vec::new();
    for i in 0..vertex_count {
        let key = vertex_key(mesh, i);
        let next = kept.len() as u32;
        let index = *seen.entry(key).or_insert_with(|| {
            kept.push(i);
            next
        });
        remap.push(index);
    }
    if kept.len() == vertex_count {
        return;
    }
    log::debug!(
        "Joined mesh '{}' from {} to {} vertices.",
        mesh.name,
        vertex_count,
        kept.len()
    );

    mesh.positions = kept.iter().map(|&i| mesh.positions[i]).collect();
    if let Some(normals) = &mut mesh.normals {
        *normals = kept.iter().map(|&i| normals[i]).collect();
    }
    if let Some(tex_coords) = &mut mesh.tex_coords {
        *tex_coords = kept.iter().map(|&i| tex_coords[i]).collect();
    }
    if let Some(tangent_space) = &mut mesh.tangent_space {
        tangent_space.tangents = kept.iter().map(|&i| tangent_space.tangents[i]).collect();
        tangent_space.bitangents = kept.iter().map(|&i| tangent_space.bitangents[i]).collect();
    }
    for face in &mut mesh.faces {
        for index in &mut face.indices {
            // out of range indices are left for the flattener to report
            if let Some(&mapped) = remap.get(*index as usize) {
                *index = mapped;
            }
        }
    }
}

fn vertex_key(mesh: &Mesh, i: usize) -> Vec<u32> {
    let mut key = Vec::with_capacity(14);
    let mut push3 = |v: Vector3<f32>| key.extend([v.x.to_bits(), v.y.to_bits(), v.z.to_bits()]);
    push3(mesh.positions[i]);
    if let Some(normals) = &mesh.normals {
        push3(normals[i]);
    }
    if let Some(tangent_space) = &mesh.tangent_space {
        push3(tangent_space.tangents[i]);
        push3(tangent_space.bitangents[i]);
    }
    if let Some(tex_coords) = &mesh.tex_coords {
        key.extend([tex_coords[i].x.to_bits(), tex_coords[i].y.to_bits()]);
    }
    key
}

/// Splits a flat index list into faces using per-face vertex counts.
///
/// An empty `arities` means the list is already made of triangles.
pub fn faces_from_indices(indices: &[u32], arities: &[u32]) -> Vec<Face> {
    if arities.is_empty() {
        return indices
            .chunks(3)
            .map(|c| Face {
                indices: c.to_vec(),
            })
            .collect();
    }
    let mut start = 0;
    arities
        .iter()
        .map(|&arity| {
            let end = (start + arity as usize).min(indices.len());
            let face = Face {
                indices: indices[start..end].to_vec(),
            };
            start = end;
            face
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use cgmath::Vector2;

    use super::*;

    fn unit_quad() -> Mesh {
        Mesh::new(
            "quad",
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(1.0, 1.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            vec![Face::triangle(0, 1, 2), Face::triangle(0, 2, 3)],
        )
        .with_normals(vec![Vector3::unit_z(); 4])
        .with_tex_coords(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ])
    }

    #[test]
    fn tangents_follow_uv_directions() {
        let tangent_space = calc_tangent_space(&unit_quad()).unwrap();
        for (t, b) in tangent_space.tangents.iter().zip(&tangent_space.bitangents) {
            assert!((*t - Vector3::unit_x()).magnitude() < 1e-6);
            assert!((*b - Vector3::unit_y()).magnitude() < 1e-6);
        }
    }

    #[test]
    fn without_uvs_tangents_are_perpendicular_to_normals() {
        let mut quad = unit_quad();
        quad.tex_coords = None;
        let tangent_space = calc_tangent_space(&quad).unwrap();
        for (t, b) in tangent_space.tangents.iter().zip(&tangent_space.bitangents) {
            assert!(t.dot(Vector3::unit_z()).abs() < 1e-6);
            assert!(b.dot(Vector3::unit_z()).abs() < 1e-6);
            assert!((t.magnitude() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn needs_normals() {
        let mut quad = unit_quad();
        quad.normals = None;
        assert!(calc_tangent_space(&quad).is_none());
    }

    #[test]
    fn joins_duplicates_and_rewrites_faces() {
        let mut quad = unit_quad();
        // split vertices as an unindexed importer would produce them
        let order = [0usize, 1, 2, 0, 2, 3];
        quad.positions = order.iter().map(|&i| quad.positions[i]).collect();
        quad.normals = Some(vec![Vector3::unit_z(); 6]);
        let uvs = quad.tex_coords.take().unwrap();
        quad.tex_coords = Some(order.iter().map(|&i| uvs[i]).collect());
        quad.faces = vec![Face::triangle(0, 1, 2), Face::triangle(3, 4, 5)];

        join_identical_vertices(&mut quad);

        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.tex_coords.as_ref().unwrap().len(), 4);
        assert_eq!(
            quad.faces,
            vec![Face::triangle(0, 1, 2), Face::triangle(0, 2, 3)]
        );
    }

    #[test]
    fn splits_indices_by_arity() {
        let faces = faces_from_indices(&[0, 1, 2, 3, 0, 3, 4], &[4, 3]);
        assert_eq!(faces[0].indices, vec![0, 1, 2, 3]);
        assert_eq!(faces[1].indices, vec![0, 3, 4]);
        assert_eq!(faces_from_indices(&[0, 1, 2, 2, 1, 3], &[]).len(), 2);
    }
}
