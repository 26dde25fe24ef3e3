use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::math::AABB;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: Vec4,
    pub roughness: f32,
    pub metallic: f32,
}

impl Material {
    pub const FALLBACK_NAME: &'static str = "Fallback grey";

    /// Uniform matte material applied to primitives that come without one.
    pub fn fallback(color: Vec3) -> Self {
        Self {
            name: Self::FALLBACK_NAME.to_string(),
            base_color: color.extend(1.0),
            roughness: 0.8,
            metallic: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Primitive {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: Option<Material>,
    pub bounds: AABB,
}

impl Primitive {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, material: Option<Material>) -> Self {
        let bounds = AABB::from_points(vertices.iter().map(|vertex| vertex.position));

        Self {
            vertices,
            indices,
            material,
            bounds,
        }
    }

    /// Builds a primitive from positions only, deriving smooth normals
    /// from the triangle list.
    pub fn with_computed_normals(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        material: Option<Material>,
    ) -> Self {
        let mut normals = vec![Vec3::ZERO; positions.len()];

        for triangle in indices.chunks_exact(3) {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
            let (Some(pa), Some(pb), Some(pc)) =
                (positions.get(a), positions.get(b), positions.get(c))
            else {
                continue;
            };

            // Area-weighted: the cross product length is twice the triangle area.
            let face_normal = (*pb - *pa).cross(*pc - *pa);
            normals[a] += face_normal;
            normals[b] += face_normal;
            normals[c] += face_normal;
        }

        let vertices = positions
            .into_iter()
            .zip(normals)
            .map(|(position, normal)| Vertex {
                position,
                normal: normal.normalize_or(Vec3::Y),
            })
            .collect();

        Self::new(vertices, indices, material)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub primitives: Vec<Primitive>,
}

impl Mesh {
    pub fn bounds(&self) -> AABB {
        self.primitives
            .iter()
            .fold(AABB::EMPTY, |aabb, primitive| aabb.union(&primitive.bounds))
    }

    /// Gives every primitive without a material a copy of `material`.
    /// Returns how many primitives were filled in.
    pub fn fill_missing_materials(&mut self, material: &Material) -> usize {
        let mut filled = 0;

        for primitive in self
            .primitives
            .iter_mut()
            .filter(|primitive| primitive.material.is_none())
        {
            primitive.material = Some(material.clone());
            filled += 1;
        }

        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computed_normals_face_outwards_for_ccw_triangle() {
        let primitive = Primitive::with_computed_normals(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
            None,
        );

        for vertex in &primitive.vertices {
            assert!((vertex.normal - Vec3::Z).length() < 1e-6);
        }
        assert_eq!(primitive.bounds.max, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(primitive.triangle_count(), 1);
    }

    #[test]
    fn fill_missing_materials_skips_existing() {
        let red = Material {
            name: "Red".to_string(),
            base_color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            roughness: 0.5,
            metallic: 0.0,
        };

        let mut mesh = Mesh {
            name: "Pair".to_string(),
            primitives: vec![
                Primitive::new(Vec::new(), Vec::new(), Some(red.clone())),
                Primitive::new(Vec::new(), Vec::new(), None),
            ],
        };

        let filled = mesh.fill_missing_materials(&Material::fallback(Vec3::splat(0.5)));

        assert_eq!(filled, 1);
        assert_eq!(mesh.primitives[0].material.as_ref(), Some(&red));
        assert_eq!(
            mesh.primitives[1].material.as_ref().map(|m| m.name.as_str()),
            Some(Material::FALLBACK_NAME)
        );
    }
}
