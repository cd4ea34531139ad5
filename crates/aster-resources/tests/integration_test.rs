//! Integration tests for model loading.

use std::path::Path;

use aster_resources::Model;

#[test]
fn test_load_cube_model() {
    // Path to the bundled test asset, relative to this crate
    let model_path = Path::new("../../assets/models/cube.obj");

    // Skip test if the asset is not present (e.g. pruned checkout)
    if !model_path.exists() {
        println!("Skipping test: model file not found at {:?}", model_path);
        return;
    }

    let model = Model::load(model_path).expect("Failed to load OBJ model");

    assert!(
        !model.meshes.is_empty(),
        "Model should have at least one mesh"
    );

    // Verify vertex data was extracted and unified
    for (i, mesh) in model.meshes.iter().enumerate() {
        assert!(
            !mesh.positions.is_empty(),
            "Mesh {} should have positions",
            i
        );
        assert_eq!(
            mesh.normals.len(),
            mesh.positions.len(),
            "Mesh {} should have same number of normals as positions",
            i
        );
        assert_eq!(
            mesh.tex_coords.len(),
            mesh.positions.len(),
            "Mesh {} should have same number of tex coords as positions",
            i
        );
        assert!(!mesh.indices.is_empty(), "Mesh {} should have indices", i);
        assert_eq!(
            mesh.indices.len() % 3,
            0,
            "Mesh {} indices should form whole triangles",
            i
        );

        // Every index must refer to a real vertex
        let vertex_count = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&index| index < vertex_count));
    }

    // A cube has 12 triangles and, with per-face attributes, 24 unique vertices
    assert_eq!(model.total_triangle_count(), 12);
    assert_eq!(model.total_vertex_count(), 24);

    // Verify AABB was computed: the cube is centered on the origin
    assert!(model.aabb_min.x < model.aabb_max.x);
    assert!(model.aabb_min.y < model.aabb_max.y);
    assert!(model.aabb_min.z < model.aabb_max.z);
    assert!(model.center().length() < 1e-5);
}
