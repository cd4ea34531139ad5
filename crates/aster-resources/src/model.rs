//! Model and mesh loading from OBJ files.
//!
//! OBJ files index positions, normals and texture coordinates independently,
//! while the GPU wants a single index stream over unified vertices. Loading
//! therefore deduplicates each unique (position, normal, texcoord) triple
//! into one vertex, exactly once, and remaps the face indices accordingly.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use glam::{Vec2, Vec3};
use tracing::{debug, info, warn};

use crate::error::{ResourceError, ResourceResult};
use crate::material::Material;

/// A mesh containing unified vertex attribute streams and an index stream.
///
/// All attribute vectors have the same length; `indices` refers into them.
#[derive(Debug, Default)]
pub struct Mesh {
    /// Mesh name from the OBJ file.
    pub name: String,
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Vertex normals (zero when the OBJ carries none).
    pub normals: Vec<Vec3>,
    /// Texture coordinates with the V axis flipped for Vulkan.
    pub tex_coords: Vec<Vec2>,
    /// Triangle indices into the attribute streams.
    pub indices: Vec<u32>,
    /// Index into [`Model::materials`], if the mesh has a material.
    pub material_id: Option<usize>,
}

impl Mesh {
    /// Number of vertices in this mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles in this mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A model containing one or more meshes and their materials.
#[derive(Debug, Default)]
pub struct Model {
    /// Meshes in this model.
    pub meshes: Vec<Mesh>,
    /// Materials referenced by the meshes.
    pub materials: Vec<Material>,
    /// Axis-aligned bounding box minimum.
    pub aabb_min: Vec3,
    /// Axis-aligned bounding box maximum.
    pub aabb_max: Vec3,
}

impl Model {
    /// Load a model from an OBJ file.
    ///
    /// Faces are triangulated during loading. A missing or broken companion
    /// MTL file is not fatal; the model just ends up without materials.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be parsed, or
    /// contains no meshes.
    pub fn load(path: &Path) -> ResourceResult<Self> {
        if !path.exists() {
            return Err(ResourceError::FileNotFound(path.to_path_buf()));
        }

        info!("Loading model: {}", path.display());

        let (models, materials) =
            tobj::load_obj(path, &load_options()).map_err(|source| ResourceError::ObjLoad {
                path: path.to_path_buf(),
                source,
            })?;

        let materials = materials.unwrap_or_else(|e| {
            warn!("Failed to load materials for {}: {}", path.display(), e);
            Vec::new()
        });

        let model = Self::from_tobj(models, &materials, path)?;

        info!(
            "Model loaded: {} meshes, {} vertices, {} triangles, {} material(s)",
            model.meshes.len(),
            model.total_vertex_count(),
            model.total_triangle_count(),
            model.materials.len()
        );

        Ok(model)
    }

    /// Load a model from an in-memory OBJ document.
    ///
    /// Material libraries referenced by the document are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or contains no
    /// meshes.
    pub fn from_obj_buf<R: BufRead>(reader: &mut R) -> ResourceResult<Self> {
        // No material resolution for in-memory documents
        let (models, _) = tobj::load_obj_buf(reader, &load_options(), |_| Ok(Default::default()))
            .map_err(|source| ResourceError::ObjLoad {
                path: "<buffer>".into(),
                source,
            })?;

        Self::from_tobj(models, &[], Path::new("<buffer>"))
    }

    /// Converts tobj output into unified meshes with a shared AABB.
    fn from_tobj(
        models: Vec<tobj::Model>,
        materials: &[tobj::Material],
        path: &Path,
    ) -> ResourceResult<Self> {
        if models.is_empty() {
            return Err(ResourceError::NoMeshes(path.to_path_buf()));
        }

        let mut meshes = Vec::with_capacity(models.len());
        let mut aabb_min = Vec3::splat(f32::MAX);
        let mut aabb_max = Vec3::splat(f32::MIN);

        for model in models {
            let mesh = unify_mesh(&model)?;

            for position in &mesh.positions {
                aabb_min = aabb_min.min(*position);
                aabb_max = aabb_max.max(*position);
            }

            debug!(
                "Mesh '{}': {} vertices, {} triangles",
                mesh.name,
                mesh.vertex_count(),
                mesh.triangle_count()
            );

            meshes.push(mesh);
        }

        Ok(Self {
            meshes,
            materials: materials.iter().map(Material::from).collect(),
            aabb_min,
            aabb_max,
        })
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Vec3 {
        (self.aabb_min + self.aabb_max) * 0.5
    }

    /// Size of the bounding box.
    pub fn size(&self) -> Vec3 {
        self.aabb_max - self.aabb_min
    }

    /// Total number of vertices across all meshes.
    pub fn total_vertex_count(&self) -> usize {
        self.meshes.iter().map(Mesh::vertex_count).sum()
    }

    /// Total number of triangles across all meshes.
    pub fn total_triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}

/// OBJ load options: triangulate everything, keep the raw index streams so
/// vertex unification happens here.
fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        ..Default::default()
    }
}

/// Sentinel for "attribute not present" in the deduplication key.
const NO_ATTR: u32 = u32::MAX;

/// Builds unified vertex streams from a tobj mesh.
///
/// Each unique (position index, normal index, texcoord index) triple becomes
/// one output vertex; repeated triples reuse the previously emitted vertex.
fn unify_mesh(model: &tobj::Model) -> ResourceResult<Mesh> {
    let mesh = &model.mesh;

    if mesh.positions.is_empty() {
        return Err(ResourceError::NoPositionData(model.name.clone()));
    }

    let mut unified = Mesh {
        name: model.name.clone(),
        material_id: mesh.material_id,
        ..Default::default()
    };

    let mut seen: HashMap<(u32, u32, u32), u32> = HashMap::new();

    for (face_vertex, &pos_index) in mesh.indices.iter().enumerate() {
        let normal_index = mesh
            .normal_indices
            .get(face_vertex)
            .copied()
            .unwrap_or(NO_ATTR);
        let texcoord_index = mesh
            .texcoord_indices
            .get(face_vertex)
            .copied()
            .unwrap_or(NO_ATTR);

        let key = (pos_index, normal_index, texcoord_index);

        let index = *seen.entry(key).or_insert_with(|| {
            let p = pos_index as usize * 3;
            unified.positions.push(Vec3::new(
                mesh.positions[p],
                mesh.positions[p + 1],
                mesh.positions[p + 2],
            ));

            let normal = if normal_index != NO_ATTR {
                let n = normal_index as usize * 3;
                Vec3::new(mesh.normals[n], mesh.normals[n + 1], mesh.normals[n + 2])
            } else {
                Vec3::ZERO
            };
            unified.normals.push(normal);

            let tex_coord = if texcoord_index != NO_ATTR {
                let t = texcoord_index as usize * 2;
                // OBJ texture space has V growing upward; Vulkan samples top-down
                Vec2::new(mesh.texcoords[t], 1.0 - mesh.texcoords[t + 1])
            } else {
                Vec2::ZERO
            };
            unified.tex_coords.push(tex_coord);

            (unified.positions.len() - 1) as u32
        });

        unified.indices.push(index);
    }

    Ok(unified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A unit quad split into two triangles sharing an edge, with normals
    /// and texture coordinates.
    const QUAD_OBJ: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_loads_and_dedups_shared_vertices() {
        let mut reader = Cursor::new(QUAD_OBJ);
        let model = Model::from_obj_buf(&mut reader).unwrap();

        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];

        // 6 face vertices, but only 4 unique (position, normal, uv) triples
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.triangle_count(), 2);

        // The shared vertices are reused by index
        assert_eq!(mesh.indices[0], mesh.indices[3]);
        assert_eq!(mesh.indices[2], mesh.indices[4]);
    }

    #[test]
    fn test_quad_aabb() {
        let mut reader = Cursor::new(QUAD_OBJ);
        let model = Model::from_obj_buf(&mut reader).unwrap();

        assert_eq!(model.aabb_min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(model.aabb_max, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(model.center(), Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(model.size(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_texcoord_v_is_flipped() {
        let mut reader = Cursor::new(QUAD_OBJ);
        let model = Model::from_obj_buf(&mut reader).unwrap();
        let mesh = &model.meshes[0];

        // First vertex has OBJ uv (0, 0), which becomes (0, 1) in Vulkan space
        let first = mesh.indices[0] as usize;
        assert_eq!(mesh.tex_coords[first], Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_normals_are_carried_through() {
        let mut reader = Cursor::new(QUAD_OBJ);
        let model = Model::from_obj_buf(&mut reader).unwrap();
        let mesh = &model.meshes[0];

        for normal in &mesh.normals {
            assert_eq!(*normal, Vec3::new(0.0, 0.0, 1.0));
        }
    }

    #[test]
    fn test_positions_without_attributes() {
        // Faces referencing only positions
        let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
        let mut reader = Cursor::new(obj);
        let model = Model::from_obj_buf(&mut reader).unwrap();
        let mesh = &model.meshes[0];

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.normals[0], Vec3::ZERO);
        assert_eq!(mesh.tex_coords[0], Vec2::ZERO);
    }

    #[test]
    fn test_quads_are_triangulated() {
        let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
f 1 2 3 4
";
        let mut reader = Cursor::new(obj);
        let model = Model::from_obj_buf(&mut reader).unwrap();

        assert_eq!(model.meshes[0].triangle_count(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Model::load(Path::new("does/not/exist.obj"));
        assert!(matches!(result, Err(ResourceError::FileNotFound(_))));
    }

    #[test]
    fn test_total_counts_sum_over_meshes() {
        let obj = "\
o first
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
o second
v 0.0 0.0 1.0
v 1.0 0.0 1.0
v 0.0 1.0 1.0
f 4 5 6
";
        let mut reader = Cursor::new(obj);
        let model = Model::from_obj_buf(&mut reader).unwrap();

        assert_eq!(model.meshes.len(), 2);
        assert_eq!(model.total_vertex_count(), 6);
        assert_eq!(model.total_triangle_count(), 2);
    }
}
