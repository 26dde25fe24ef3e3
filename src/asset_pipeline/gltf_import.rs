use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glam::{Quat, Vec3, Vec4};
use itertools::izip;

use crate::asset_pipeline::asset_graph::{AssetGraph, AssetNode};
use crate::asset_pipeline::materials::MaterialLibrary;
use crate::error::{LoadError, LoadResult};
use crate::scene_graph::mesh::{Material, Mesh, Primitive, Vertex};

type Buffers<'a> = &'a [gltf::buffer::Data];

/// Parses a glTF or GLB document into an [`AssetGraph`].
///
/// `base` is the directory relative buffer URIs resolve against; without it
/// only embedded and GLB buffers can be read. Materials come from `library`
/// when it has a matching entry, then from the document itself, and any
/// primitive still without one gets `fallback`.
pub fn import_gltf(
    url: &str,
    bytes: &[u8],
    base: Option<&Path>,
    library: Option<&MaterialLibrary>,
    fallback: &Material,
) -> LoadResult<AssetGraph> {
    let gltf_error = |source| LoadError::Gltf {
        url: url.to_string(),
        source,
    };

    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes).map_err(gltf_error)?;
    let buffers = gltf::import_buffers(&document, base, blob).map_err(gltf_error)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| LoadError::EmptyAsset(url.to_string()))?;

    let mut importer = Importer {
        buffers: &buffers,
        library,
        fallback,
        meshes: HashMap::new(),
    };

    let roots = scene
        .nodes()
        .map(|node| importer.import_node(&node))
        .collect::<LoadResult<Vec<_>>>()?;

    let graph = AssetGraph {
        name: asset_name(url),
        roots,
    };

    log::debug!(
        "Imported {} with {} nodes and {} meshes",
        graph.name,
        graph.node_count(),
        importer.meshes.len()
    );

    Ok(graph)
}

fn asset_name(url: &str) -> String {
    url.rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(url)
        .to_string()
}

struct Importer<'a> {
    buffers: Buffers<'a>,
    library: Option<&'a MaterialLibrary>,
    fallback: &'a Material,
    /// glTF mesh index -> converted mesh, so instanced meshes are shared.
    meshes: HashMap<usize, Arc<Mesh>>,
}

impl Importer<'_> {
    fn import_node(&mut self, node: &gltf::Node) -> LoadResult<AssetNode> {
        let name = node
            .name()
            .map(String::from)
            .unwrap_or_else(|| format!("Node {}", node.index()));
        let (translation, rotation, scale) = node.transform().decomposed();

        let mesh = match node.mesh() {
            Some(mesh) => Some(self.import_mesh(&mesh, &name)?),
            None => None,
        };

        let children = node
            .children()
            .map(|child| self.import_node(&child))
            .collect::<LoadResult<Vec<_>>>()?;

        Ok(AssetNode {
            name,
            translation: Vec3::from(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from(scale),
            mesh,
            children,
        })
    }

    fn import_mesh(&mut self, mesh: &gltf::Mesh, node_name: &str) -> LoadResult<Arc<Mesh>> {
        if let Some(existing) = self.meshes.get(&mesh.index()) {
            return Ok(existing.clone());
        }

        let mesh_name = mesh
            .name()
            .map(String::from)
            .unwrap_or_else(|| format!("{} (Mesh)", node_name));

        let primitives = mesh
            .primitives()
            .map(|primitive| self.import_primitive(&mesh_name, &primitive))
            .collect::<LoadResult<Vec<_>>>()?;

        let mut converted = Mesh {
            name: mesh_name,
            primitives,
        };

        let filled = converted.fill_missing_materials(self.fallback);
        if filled > 0 {
            log::debug!(
                "Applied fallback material to {} primitive(s) of {}",
                filled,
                converted.name
            );
        }

        let converted = Arc::new(converted);
        self.meshes.insert(mesh.index(), converted.clone());
        Ok(converted)
    }

    fn import_primitive(
        &self,
        mesh_name: &str,
        primitive: &gltf::Primitive,
    ) -> LoadResult<Primitive> {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            return Err(LoadError::UnsupportedPrimitive {
                mesh: mesh_name.to_string(),
                mode: primitive.mode(),
            });
        }

        let buffers = self.buffers;
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .ok_or_else(|| LoadError::MissingPositions {
                mesh: mesh_name.to_string(),
                index: primitive.index(),
            })?
            .map(Vec3::from)
            .collect();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let material = self.resolve_material(mesh_name, &primitive.material());

        let primitive = match reader.read_normals() {
            Some(normals) => {
                let vertices = izip!(positions, normals)
                    .map(|(position, normal)| Vertex {
                        position,
                        normal: Vec3::from(normal),
                    })
                    .collect();
                Primitive::new(vertices, indices, material)
            }
            None => Primitive::with_computed_normals(positions, indices, material),
        };

        Ok(primitive)
    }

    fn resolve_material(&self, mesh_name: &str, material: &gltf::Material) -> Option<Material> {
        if let Some(material) = self
            .library
            .and_then(|library| library.resolve(material.name(), mesh_name))
        {
            return Some(material);
        }

        // The implicit default material has no index; treat it as missing.
        material.index()?;

        let pbr = material.pbr_metallic_roughness();
        Some(Material {
            name: material
                .name()
                .map(String::from)
                .unwrap_or_else(|| format!("Material {}", material.index().unwrap_or_default())),
            base_color: Vec4::from(pbr.base_color_factor()),
            roughness: pbr.roughness_factor(),
            metallic: pbr.metallic_factor(),
        })
    }
}
