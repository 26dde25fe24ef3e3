use std::collections::HashMap;
use std::mem::offset_of;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use crate::scene_graph::{Material, Mesh, ObjectId, Primitive, Scene, Transform, Vertex};

pub const VERTEX_BUFFER_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, position) as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, normal) as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
    ],
};

/// Per-primitive draw data, bound at group 1.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DrawUniform {
    pub model: Mat4,
    pub normal: Mat4,
    pub base_color: Vec4,
    /// x: roughness, y: metallic.
    pub surface: Vec4,
}

impl DrawUniform {
    pub fn new(transform: &Transform, material: &Material) -> Self {
        Self {
            model: *transform.get_world_matrix(),
            normal: *transform.get_normal_matrix(),
            base_color: material.base_color,
            surface: Vec4::new(material.roughness, material.metallic, 0.0, 0.0),
        }
    }
}

/// Identity of a shared [`Mesh`]: nodes instancing the same `Arc<Mesh>`
/// share one set of GPU geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshKey(usize);

impl MeshKey {
    pub fn of(mesh: &Arc<Mesh>) -> Self {
        MeshKey(Arc::as_ptr(mesh) as usize)
    }
}

/// Mesh nodes of a scene grouped by the mesh they draw.
#[derive(Default)]
pub struct DrawList {
    pub meshes: HashMap<MeshKey, Arc<Mesh>>,
    pub nodes: Vec<(ObjectId, MeshKey)>,
}

impl DrawList {
    pub fn gather(scene: &Scene) -> Self {
        let mut list = DrawList::default();

        for (id, object) in scene.iter_objects() {
            let Some(mesh) = object.mesh.as_ref() else {
                continue;
            };

            let key = MeshKey::of(mesh);
            list.meshes.entry(key).or_insert_with(|| mesh.clone());
            list.nodes.push((id, key));
        }

        list
    }
}

pub struct PrimitiveBuffers {
    pub vertices: wgpu::Buffer,
    pub indices: wgpu::Buffer,
    pub index_count: u32,
    pub material: Material,
}

impl PrimitiveBuffers {
    fn new(device: &wgpu::Device, mesh: &Mesh, index: usize, primitive: &Primitive, fallback: &Material) -> Self {
        let vertex_buffer_name = format!("Vertex buffer ({}, primitive {})", mesh.name, index);
        let index_buffer_name = format!("Index buffer ({}, primitive {})", mesh.name, index);

        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&vertex_buffer_name),
            contents: bytemuck::cast_slice(&primitive.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&index_buffer_name),
            contents: bytemuck::cast_slice(&primitive.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertices,
            indices,
            index_count: primitive.indices.len() as u32,
            material: primitive.material.clone().unwrap_or_else(|| fallback.clone()),
        }
    }
}

/// GPU geometry of one mesh, shared by every node that draws it. Holds the
/// mesh so its [`MeshKey`] cannot be reused while the buffers live.
pub struct MeshBuffers {
    _mesh: Arc<Mesh>,
    pub primitives: Vec<PrimitiveBuffers>,
}

impl MeshBuffers {
    pub fn new(device: &wgpu::Device, mesh: Arc<Mesh>, fallback: &Material) -> Self {
        let primitives = mesh
            .primitives
            .iter()
            .enumerate()
            .filter(|(_, primitive)| !primitive.indices.is_empty())
            .map(|(index, primitive)| PrimitiveBuffers::new(device, &mesh, index, primitive, fallback))
            .collect();

        Self {
            _mesh: mesh,
            primitives,
        }
    }
}

struct DrawBinding {
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Per-node draw uniforms, one per primitive of the node's mesh.
pub struct NodeDraw {
    pub mesh: MeshKey,
    bindings: Vec<DrawBinding>,
}

impl NodeDraw {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        mesh_key: MeshKey,
        mesh: &MeshBuffers,
    ) -> Self {
        let bindings = mesh
            .primitives
            .iter()
            .map(|primitive| {
                let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Draw uniform buffer"),
                    contents: bytemuck::cast_slice(&[DrawUniform::new(
                        &Transform::default(),
                        &primitive.material,
                    )]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });

                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Draw uniform bind group"),
                    layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform.as_entire_binding(),
                    }],
                });

                DrawBinding { uniform, bind_group }
            })
            .collect();

        Self {
            mesh: mesh_key,
            bindings,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, transform: &Transform, mesh: &MeshBuffers) {
        for (binding, primitive) in self.bindings.iter().zip(&mesh.primitives) {
            let uniform = DrawUniform::new(transform, &primitive.material);
            queue.write_buffer(&binding.uniform, 0, bytemuck::cast_slice(&[uniform]));
        }
    }

    /// Bind groups paired with the primitives they draw.
    pub fn draws<'a>(
        &'a self,
        mesh: &'a MeshBuffers,
    ) -> impl Iterator<Item = (&'a wgpu::BindGroup, &'a PrimitiveBuffers)> {
        self.bindings
            .iter()
            .map(|binding| &binding.bind_group)
            .zip(&mesh.primitives)
    }
}
