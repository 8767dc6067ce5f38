use cgmath::{Vector2, Vector3};
use flow_flatten::{Face, Mesh, SceneGraph, flatten};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Random tree with random triangle meshes; some meshes lack UVs and some nodes share meshes.
fn random_scene(rng: &mut StdRng) -> (SceneGraph, usize, usize) {
    let mut scene = SceneGraph::new();
    let mut nodes = vec![scene.root()];
    let mut mesh_ids = Vec::new();
    let mut vertices = 0;
    let mut faces = 0;

    for _ in 0..rng.random_range(0..30) {
        let parent = nodes[rng.random_range(0..nodes.len())];
        let node = scene.add_child(parent, None).unwrap();
        nodes.push(node);

        for _ in 0..rng.random_range(0..3) {
            let reuse = !mesh_ids.is_empty() && rng.random_bool(0.3);
            let (id, vertex_count, face_count) = if reuse {
                mesh_ids[rng.random_range(0..mesh_ids.len())]
            } else {
                let vertex_count = rng.random_range(3..20);
                let face_count = rng.random_range(0..10);
                let faces = (0..face_count)
                    .map(|_| {
                        Face::triangle(
                            rng.random_range(0..vertex_count as u32),
                            rng.random_range(0..vertex_count as u32),
                            rng.random_range(0..vertex_count as u32),
                        )
                    })
                    .collect();
                let positions = (0..vertex_count)
                    .map(|_| Vector3::new(rng.random(), rng.random(), rng.random()))
                    .collect();
                let mut mesh = Mesh::new("random", positions, faces)
                    .with_normals(vec![Vector3::unit_y(); vertex_count])
                    .with_tangent_space(
                        vec![Vector3::unit_x(); vertex_count],
                        vec![Vector3::unit_z(); vertex_count],
                    );
                if rng.random_bool(0.5) {
                    mesh = mesh.with_tex_coords(vec![Vector2::new(0.5, 0.5); vertex_count]);
                }
                let entry = (scene.add_mesh(mesh), vertex_count, face_count);
                mesh_ids.push(entry);
                entry
            };
            scene.attach_mesh(node, id);
            vertices += vertex_count;
            faces += face_count;
        }
    }
    (scene, vertices, faces)
}

#[test]
fn flattening_preserves_counts_and_index_validity() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let (scene, vertices, faces) = random_scene(&mut rng);
        let flattened = flatten(&scene).unwrap();

        assert_eq!(flattened.positions.len(), vertices);
        assert_eq!(flattened.uvs.len(), vertices);
        assert_eq!(flattened.normals.len(), vertices);
        assert_eq!(flattened.tangents.len(), vertices);
        assert_eq!(flattened.bitangents.len(), vertices);
        assert_eq!(flattened.indices.len(), 3 * faces);
        assert!(flattened.indices.iter().all(|&i| (i as usize) < vertices));
    }
}

#[test]
fn flattening_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let (scene, _, _) = random_scene(&mut rng);
        assert_eq!(flatten(&scene).unwrap(), flatten(&scene).unwrap());
    }
}

#[test]
fn sibling_meshes_are_offset_by_earlier_vertex_counts() {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let a = scene.add_mesh(
        Mesh::new(
            "a",
            vec![Vector3::new(0.0, 0.0, 0.0); 3],
            vec![Face::triangle(0, 1, 2)],
        )
        .with_normals(vec![Vector3::unit_z(); 3])
        .with_tangent_space(vec![Vector3::unit_x(); 3], vec![Vector3::unit_y(); 3]),
    );
    let b = scene.add_mesh(
        Mesh::new(
            "b",
            vec![Vector3::new(1.0, 1.0, 1.0); 4],
            vec![Face::triangle(0, 1, 3)],
        )
        .with_normals(vec![Vector3::unit_z(); 4])
        .with_tangent_space(vec![Vector3::unit_x(); 4], vec![Vector3::unit_y(); 4]),
    );
    scene.attach_mesh(root, a);
    scene.attach_mesh(root, b);

    let flattened = flatten(&scene).unwrap();
    assert_eq!(flattened.positions.len(), 7);
    assert_eq!(flattened.indices, vec![0, 1, 2, 3, 4, 6]);
    assert!(flattened.uvs.iter().all(|uv| *uv == Vector2::new(0.0, 0.0)));
}
