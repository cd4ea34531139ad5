//! Material definitions and loading.

use std::path::PathBuf;

use glam::Vec3;

/// Material properties loaded from an OBJ's companion MTL file.
#[derive(Debug, Clone)]
pub struct Material {
    /// Material name from the MTL file.
    pub name: String,
    /// Diffuse base color.
    pub base_color: Vec3,
    /// Path to the diffuse texture, if the material references one.
    pub diffuse_texture: Option<PathBuf>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color: Vec3::ONE,
            diffuse_texture: None,
        }
    }
}

impl From<&tobj::Material> for Material {
    fn from(m: &tobj::Material) -> Self {
        Self {
            name: m.name.clone(),
            base_color: m.diffuse.map(Vec3::from_array).unwrap_or(Vec3::ONE),
            diffuse_texture: m.diffuse_texture.as_ref().map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material_is_white() {
        let material = Material::default();
        assert_eq!(material.base_color, Vec3::ONE);
        assert!(material.diffuse_texture.is_none());
    }

    #[test]
    fn test_from_tobj_material() {
        let tobj_material = tobj::Material {
            name: "wood".to_string(),
            diffuse: Some([0.5, 0.25, 0.1]),
            diffuse_texture: Some("wood.png".to_string()),
            ..Default::default()
        };

        let material = Material::from(&tobj_material);
        assert_eq!(material.name, "wood");
        assert_eq!(material.base_color, Vec3::new(0.5, 0.25, 0.1));
        assert_eq!(material.diffuse_texture, Some(PathBuf::from("wood.png")));
    }

    #[test]
    fn test_from_tobj_material_without_diffuse() {
        let tobj_material = tobj::Material {
            name: "flat".to_string(),
            ..Default::default()
        };

        let material = Material::from(&tobj_material);
        assert_eq!(material.base_color, Vec3::ONE);
        assert!(material.diffuse_texture.is_none());
    }
}
