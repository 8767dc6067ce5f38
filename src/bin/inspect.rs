//! Prints vertex and triangle counts for each asset named on the command line.
//!
//! Native only: the tokio runtime isn't available on wasm32, where the binary is an empty stub.

#[cfg(not(target_arch = "wasm32"))]
use flow_flatten::{ImportOptions, import_mesh};

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    flow_flatten::init_logging();

    let files: Vec<String> = std::env::args().skip(1).collect();
    if files.is_empty() {
        anyhow::bail!("usage: mesh-inspect <file>...");
    }

    let options = ImportOptions::from_env();
    let mut failed = 0;
    for file in &files {
        match import_mesh(file, &options).await {
            Ok(mesh) => {
                let max_index = mesh.indices.iter().max().copied();
                log::info!(
                    "{}: {} vertices, {} triangles, {} indices (max {:?})",
                    file,
                    mesh.vertex_count(),
                    mesh.triangle_count(),
                    mesh.indices.len(),
                    max_index
                );
                println!(
                    "{}\t{}\t{}",
                    file,
                    mesh.vertex_count(),
                    mesh.triangle_count()
                );
            }
            Err(e) => {
                log::error!("{}: {}", file, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} files could not be loaded", failed, files.len());
    }
    Ok(())
}
