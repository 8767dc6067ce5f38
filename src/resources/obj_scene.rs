//! Wavefront OBJ importer.
//!
//! Each OBJ model (`o`/`g` group) becomes one mesh on its own child of the root.

use std::io::{BufReader, Cursor};

use cgmath::{Vector2, Vector3};

use crate::{
    data_structures::{mesh::Mesh, scene_graph::SceneGraph},
    error::ImportError,
    resources::{ImportOptions, load_string, mesh::faces_from_indices, post_process, sibling_path},
};

pub async fn load_scene_obj(
    file_name: &str,
    options: &ImportOptions,
) -> Result<SceneGraph, ImportError> {
    let obj_text = load_string(file_name, options)
        .await
        .map_err(|source| ImportError::Read {
            path: file_name.to_string(),
            source,
        })?;
    let obj_cursor = Cursor::new(obj_text);
    let mut obj_reader = BufReader::new(obj_cursor);

    // `single_index` merges the separate position/uv/normal indices into one
    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: options.triangulate,
            single_index: true,
            ..Default::default()
        },
        |p| {
            let path = sibling_path(file_name, &p);
            async move {
                match load_string(&path, options).await {
                    Ok(mat_text) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mat_text))),
                    Err(_) => Err(tobj::LoadError::OpenFileFailed),
                }
            }
        },
    )
    .await?;
    // Materials only matter to the renderer, but a broken reference is worth knowing about
    if let Err(e) = obj_materials {
        log::warn!("Materials of {} could not be loaded: {}", file_name, e);
    }

    let mut graph = SceneGraph::new();
    let root = graph.root();
    for model in models {
        let mut mesh = to_mesh(&model);
        post_process(&mut mesh, options);
        let mesh_id = graph.add_mesh(mesh);
        if let Some(node) = graph.add_child(root, Some(model.name)) {
            graph.attach_mesh(node, mesh_id);
        }
    }
    Ok(graph)
}

fn to_mesh(model: &tobj::Model) -> Mesh {
    let m = &model.mesh;
    let vertex_count = m.positions.len() / 3;
    let positions = (0..vertex_count)
        .map(|i| Vector3::new(m.positions[i * 3], m.positions[i * 3 + 1], m.positions[i * 3 + 2]))
        .collect();

    let normals = (!m.normals.is_empty()).then(|| {
        m.normals
            .chunks_exact(3)
            .map(|n| Vector3::new(n[0], n[1], n[2]))
            .collect()
    });
    let tex_coords = (!m.texcoords.is_empty()).then(|| {
        m.texcoords
            .chunks_exact(2)
            .map(|uv| Vector2::new(uv[0], uv[1]))
            .collect()
    });

    Mesh {
        name: model.name.clone(),
        positions,
        normals,
        tex_coords,
        tangent_space: None,
        faces: faces_from_indices(&m.indices, &m.face_arities),
    }
}
