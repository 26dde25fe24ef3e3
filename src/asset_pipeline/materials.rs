use std::collections::HashMap;

use glam::{Vec3, Vec4};
use serde::Deserialize;

use crate::error::{LoadError, LoadResult};
use crate::scene_graph::mesh::Material;

/// Material description loaded alongside a mesh. Entries are looked up by
/// the glTF material name first and the mesh name second.
///
/// ```json
/// { "materials": { "Body": { "color": [0.8, 0.1, 0.1], "roughness": 0.4 } } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialLibrary {
    pub materials: HashMap<String, MaterialDescription>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MaterialDescription {
    pub color: Vec3,
    pub opacity: f32,
    pub roughness: f32,
    pub metallic: f32,
}

impl Default for MaterialDescription {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            opacity: 1.0,
            roughness: 0.8,
            metallic: 0.0,
        }
    }
}

impl MaterialLibrary {
    pub fn from_slice(url: &str, bytes: &[u8]) -> LoadResult<Self> {
        serde_json::from_slice(bytes).map_err(|source| LoadError::MaterialLibrary {
            url: url.to_string(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn resolve(&self, material_name: Option<&str>, mesh_name: &str) -> Option<Material> {
        material_name
            .and_then(|name| self.get(name))
            .or_else(|| self.get(mesh_name))
    }

    fn get(&self, name: &str) -> Option<Material> {
        self.materials.get(name).map(|description| Material {
            name: name.to_string(),
            base_color: Vec4::from((description.color, description.opacity)),
            roughness: description.roughness,
            metallic: description.metallic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"{
        "materials": {
            "Paint": { "color": [1.0, 0.0, 0.0], "roughness": 0.3 },
            "Wheel": { "color": [0.1, 0.1, 0.1], "metallic": 1.0 }
        }
    }"#;

    #[test]
    fn resolves_by_material_then_mesh_name() {
        let library = MaterialLibrary::from_slice("car.json", LIBRARY.as_bytes()).unwrap();
        assert_eq!(library.len(), 2);

        let paint = library.resolve(Some("Paint"), "Wheel").unwrap();
        assert_eq!(paint.name, "Paint");
        assert_eq!(paint.base_color, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(paint.roughness, 0.3);

        let wheel = library.resolve(Some("Unknown"), "Wheel").unwrap();
        assert_eq!(wheel.metallic, 1.0);

        assert!(library.resolve(None, "Chassis").is_none());
    }

    #[test]
    fn malformed_library_reports_url() {
        let error = MaterialLibrary::from_slice("bad.json", b"{ not json").unwrap_err();
        assert!(error.to_string().contains("bad.json"));
    }
}
