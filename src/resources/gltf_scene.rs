//! glTF 2.0 importer.
//!
//! Every primitive becomes one [`Mesh`]; a glTF mesh used by several nodes is
//! converted once and shared through the mesh table.

use std::collections::HashMap;

use cgmath::{InnerSpace, Vector2, Vector3, Vector4};
use gltf::mesh::Mode;

use crate::{
    data_structures::{
        mesh::{Face, Mesh, TangentSpace},
        scene_graph::{MeshId, NodeId, SceneGraph},
    },
    error::ImportError,
    resources::{ImportOptions, load_binary, post_process, sibling_path},
};

enum BufferSource {
    Blob(Option<Vec<u8>>),
    Embedded,
    File(String),
}

pub async fn load_scene_gltf(
    file_name: &str,
    options: &ImportOptions,
) -> Result<SceneGraph, ImportError> {
    let gltf_bytes = load_binary(file_name, options)
        .await
        .map_err(|source| ImportError::Read {
            path: file_name.to_string(),
            source,
        })?;
    let gltf = gltf::Gltf::from_slice(&gltf_bytes)?;
    let gltf::Gltf { document, blob } = gltf;

    let buffer_data = load_buffers(&document, blob, file_name, options).await?;
    to_scene_graph(&document, &buffer_data, options)
}

async fn load_buffers(
    document: &gltf::Document,
    blob: Option<Vec<u8>>,
    file_name: &str,
    options: &ImportOptions,
) -> Result<Vec<Vec<u8>>, ImportError> {
    let mut blob = blob;
    let loads = document.buffers().map(|buffer| {
        let index = buffer.index();
        let source = match buffer.source() {
            gltf::buffer::Source::Bin => BufferSource::Blob(blob.take()),
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => BufferSource::Embedded,
            gltf::buffer::Source::Uri(uri) => BufferSource::File(sibling_path(file_name, uri)),
        };
        async move {
            match source {
                BufferSource::Blob(Some(data)) => Ok(data),
                BufferSource::Blob(None) => Err(ImportError::MissingBuffer(index)),
                BufferSource::Embedded => Err(ImportError::EmbeddedBuffer(index)),
                BufferSource::File(path) => load_binary(&path, options)
                    .await
                    .map_err(|source| ImportError::Read { path, source }),
            }
        }
    });
    futures::future::join_all(loads).await.into_iter().collect()
}

/// Builds the scene graph of the default scene, or of the first scene if there is no default.
pub fn to_scene_graph(
    document: &gltf::Document,
    buffer_data: &[Vec<u8>],
    options: &ImportOptions,
) -> Result<SceneGraph, ImportError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(ImportError::NoScene)?;

    let mut graph = SceneGraph::new();
    let root = graph.root();
    if let Some(root_node) = graph.node_mut(root) {
        root_node.name = scene.name().map(str::to_string);
    }

    let mut converted: HashMap<usize, Vec<MeshId>> = HashMap::new();
    let mut pending: Vec<(gltf::Node, NodeId)> = scene.nodes().map(|node| (node, root)).collect();
    pending.reverse();
    while let Some((node, parent)) = pending.pop() {
        let Some(id) = graph.add_child(parent, node.name().map(str::to_string)) else {
            continue;
        };
        if let Some(scene_node) = graph.node_mut(id) {
            scene_node.local_transform = Some(node.transform().matrix().into());
        }
        if let Some(mesh) = node.mesh() {
            let mesh_ids = match converted.get(&mesh.index()) {
                Some(ids) => ids.clone(),
                None => {
                    let ids: Vec<MeshId> = to_meshes(&mesh, buffer_data, options)
                        .into_iter()
                        .map(|m| graph.add_mesh(m))
                        .collect();
                    converted.insert(mesh.index(), ids.clone());
                    ids
                }
            };
            for mesh_id in mesh_ids {
                graph.attach_mesh(id, mesh_id);
            }
        }
        let children: Vec<_> = node.children().collect();
        pending.extend(children.into_iter().rev().map(|child| (child, id)));
    }

    Ok(graph)
}

fn to_meshes(mesh: &gltf::Mesh, buffer_data: &[Vec<u8>], options: &ImportOptions) -> Vec<Mesh> {
    let name = mesh.name().unwrap_or("unknown_mesh");
    mesh.primitives()
        .filter_map(|primitive| {
            let converted = to_mesh(name, &primitive, buffer_data);
            converted.map(|mut m| {
                post_process(&mut m, options);
                m
            })
        })
        .collect()
}

fn to_mesh(name: &str, primitive: &gltf::Primitive, buffer_data: &[Vec<u8>]) -> Option<Mesh> {
    let mode = primitive.mode();
    if matches!(
        mode,
        Mode::Points | Mode::Lines | Mode::LineLoop | Mode::LineStrip
    ) {
        log::warn!(
            "Skipping primitive {} of mesh {}: {:?} primitives aren't triangles.",
            primitive.index(),
            name,
            mode
        );
        return None;
    }

    let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));

    let Some(positions) = reader.read_positions() else {
        log::warn!(
            "Skipping primitive {} of mesh {}: it has no positions.",
            primitive.index(),
            name
        );
        return None;
    };
    let positions: Vec<Vector3<f32>> = positions.map(Vector3::from).collect();

    let normals: Option<Vec<Vector3<f32>>> = reader
        .read_normals()
        .map(|normals| normals.map(Vector3::from).collect());

    let tex_coords: Option<Vec<Vector2<f32>>> = reader
        .read_tex_coords(0)
        .map(|tex_coords| tex_coords.into_f32().map(Vector2::from).collect());

    // GLTF represents tangents as vec4 where the 4th elem can be used to calculate the bitangent
    let tangent_space = match (reader.read_tangents(), &normals) {
        (Some(tangents), Some(normals)) => {
            let tangents: Vec<Vector4<f32>> = tangents.map(Vector4::from).collect();
            Some(TangentSpace {
                bitangents: tangents
                    .iter()
                    .zip(normals)
                    .map(|(tangent, normal)| normal.cross(tangent.truncate()) * tangent.w)
                    .collect(),
                tangents: tangents.iter().map(|tangent| tangent.truncate()).collect(),
            })
        }
        _ => None,
    };

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => {
            let Some(indices) = sequential_indices(positions.len()) else {
                log::warn!(
                    "Skipping primitive {} of mesh {}: {} vertices can't be addressed with u32 indices.",
                    primitive.index(),
                    name,
                    positions.len()
                );
                return None;
            };
            indices
        }
    };

    let faces = match mode {
        Mode::TriangleStrip => strip_to_faces(&indices),
        Mode::TriangleFan => fan_to_faces(&indices),
        _ => indices
            .chunks(3)
            .map(|c| Face {
                indices: c.to_vec(),
            })
            .collect(),
    };

    let mesh = Mesh {
        name: name.to_string(),
        positions,
        normals,
        tex_coords,
        tangent_space,
        faces,
    };
    if let Some(normals) = &mesh.normals {
        if normals.iter().any(|n| n.magnitude2() == 0.0) {
            log::debug!("Mesh {} contains zero-length normals.", name);
        }
    }
    Some(mesh)
}

/// Index list `0..count` for a non-indexed primitive, or `None` if `count` doesn't fit in `u32`.
fn sequential_indices(count: usize) -> Option<Vec<u32>> {
    let count = u32::try_from(count).ok()?;
    Some((0..count).collect())
}

fn strip_to_faces(indices: &[u32]) -> Vec<Face> {
    indices
        .windows(3)
        .enumerate()
        .map(|(i, w)| {
            if i % 2 == 0 {
                Face::triangle(w[0], w[1], w[2])
            } else {
                Face::triangle(w[0], w[2], w[1])
            }
        })
        .collect()
}

fn fan_to_faces(indices: &[u32]) -> Vec<Face> {
    match indices.split_first() {
        Some((&center, rest)) => rest
            .windows(2)
            .map(|w| Face::triangle(w[0], w[1], center))
            .collect(),
        None => Vec::new(),
    }
}
