use std::path::{Path, PathBuf};

use crate::{
    data_structures::{mesh::Mesh, model::FlattenedMesh, scene_graph::SceneGraph},
    error::{ImportError, LoadError},
    flatten::{flatten, flatten_into},
};

/**
 * This module contains all logic for loading meshes from external files into a `SceneGraph`.
 */
pub mod gltf_scene;
pub mod mesh;
pub mod obj_scene;
pub mod upload;

/// Environment variable read by [`ImportOptions::from_env`].
pub const ASSET_ROOT_ENV: &str = "FLOW_FLATTEN_ASSET_ROOT";

/// Post-processing applied while importing.
///
/// The defaults produce scene graphs the flattener accepts for any file that
/// has normals.
#[derive(Clone, Debug)]
pub struct ImportOptions {
    /// Directory (native) or URL path (wasm) file names are resolved against.
    pub asset_root: Option<PathBuf>,
    /// Splits OBJ polygons into triangles.
    pub triangulate: bool,
    pub join_identical_vertices: bool,
    /// Generates tangents and bitangents for meshes that don't carry them.
    pub calc_tangent_space: bool,
    /// Replaces every `v` texture coordinate with `1 - v`.
    pub flip_uvs: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            asset_root: None,
            triangulate: true,
            join_identical_vertices: true,
            calc_tangent_space: true,
            flip_uvs: false,
        }
    }
}

impl ImportOptions {
    /// Default options with `asset_root` taken from `FLOW_FLATTEN_ASSET_ROOT` if it is set.
    pub fn from_env() -> Self {
        Self {
            asset_root: std::env::var_os(ASSET_ROOT_ENV).map(PathBuf::from),
            ..Default::default()
        }
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = Some(root.into());
        self
    }

    pub fn resolve(&self, file_name: &str) -> PathBuf {
        match &self.asset_root {
            Some(root) => root.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

/// Resolves `uri` relative to the directory of `file_name`.
pub(crate) fn sibling_path(file_name: &str, uri: &str) -> String {
    match Path::new(file_name).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(uri).to_string_lossy().into_owned(),
        _ => uri.to_string(),
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str, options: &ImportOptions) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page has no origin"))?;
    let base = reqwest::Url::parse(&format!("{}/", origin))?;
    let path = options.resolve(file_name);
    Ok(base.join(&path.to_string_lossy())?)
}

pub async fn load_string(file_name: &str, options: &ImportOptions) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(file_name, options)?;
        reqwest::get(url).await?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = std::fs::read_to_string(options.resolve(file_name))?;

    Ok(txt)
}

pub async fn load_binary(file_name: &str, options: &ImportOptions) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name, options)?;
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = std::fs::read(options.resolve(file_name))?;

    Ok(data)
}

/// Parses `file_name` into a scene graph, picking the importer by file extension.
pub async fn import_scene(
    file_name: &str,
    options: &ImportOptions,
) -> Result<SceneGraph, ImportError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    let scene = match extension.as_str() {
        "gltf" | "glb" => gltf_scene::load_scene_gltf(file_name, options).await?,
        "obj" => obj_scene::load_scene_obj(file_name, options).await?,
        ext => return Err(ImportError::UnsupportedFormat(ext.to_string())),
    };
    log::debug!(
        "Imported {}: {} nodes, {} meshes",
        file_name,
        scene.node_count(),
        scene.meshes().len()
    );
    Ok(scene)
}

/// Imports `file_name` and flattens everything reachable from its root.
pub async fn import_mesh(
    file_name: &str,
    options: &ImportOptions,
) -> Result<FlattenedMesh, LoadError> {
    let scene = import_scene(file_name, options).await?;
    Ok(flatten(&scene)?)
}

/**
 * Imports `file_name` and appends its geometry to `out`, reporting failures through the log
 * instead of an error value.
 *
 * Anything already in `out` is kept and the new indices are offset past it. Returns `false`
 * and leaves `out` untouched when the file couldn't be imported or flattened.
 * Tangents and bitangents are always filled in; callers that don't need them can ignore them.
 */
pub async fn import_mesh_into(
    file_name: &str,
    options: &ImportOptions,
    out: &mut FlattenedMesh,
) -> bool {
    let appended = match import_scene(file_name, options).await {
        Ok(scene) => flatten_into(&scene, out).map_err(LoadError::from),
        Err(e) => Err(LoadError::from(e)),
    };
    match appended {
        Ok(()) => true,
        Err(e) => {
            log::error!("Mesh loading error for {}: {}", file_name, e);
            false
        }
    }
}

/// Runs the post-processing steps `options` asks for on a freshly imported mesh.
pub(crate) fn post_process(imported: &mut Mesh, options: &ImportOptions) {
    if options.flip_uvs {
        if let Some(tex_coords) = &mut imported.tex_coords {
            tex_coords.iter_mut().for_each(|uv| uv.y = 1.0 - uv.y);
        }
    }
    if options.join_identical_vertices {
        mesh::join_identical_vertices(imported);
    }
    if options.calc_tangent_space && imported.tangent_space.is_none() {
        imported.tangent_space = mesh::calc_tangent_space(imported);
        if imported.tangent_space.is_none() {
            log::warn!(
                "Mesh '{}' has no normals, so no tangent space could be calculated.",
                imported.name
            );
        }
    }
}
