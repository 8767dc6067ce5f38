#[cfg(feature = "integration-tests")]
use flow_flatten::{ImportOptions, ModelVertex, import_mesh, resources::upload::GpuMesh};

#[test]
#[cfg(feature = "integration-tests")]
fn should_upload_flattened_mesh() {
    futures::executor::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let Ok(adapter) = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
        else {
            log::warn!("no adapter available, skipping upload test");
            return;
        };
        let (device, _queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .expect("failed to create device");

        let options = ImportOptions::default()
            .with_asset_root(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"));
        let mesh = import_mesh("two_objects.obj", &options).await.unwrap();
        let gpu_mesh = GpuMesh::new(&device, "two_objects", &mesh);

        assert_eq!(gpu_mesh.num_elements, 9);
        assert_eq!(
            gpu_mesh.vertex_buffer.size(),
            (mesh.vertex_count() * std::mem::size_of::<ModelVertex>()) as u64
        );
        assert_eq!(gpu_mesh.index_buffer.size(), 9 * 4);
    });
}
