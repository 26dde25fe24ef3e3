use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Context;
use wgpu::CommandEncoderDescriptor;
use winit::window::Window;

use crate::{
    camera::Camera,
    host::Viewport,
    lighting::LightingState,
    rendering::{
        global_uniform::{GlobalUniform, GlobalUniformState},
        mesh_buffers::{DrawList, MeshBuffers, MeshKey, NodeDraw},
        passes::forward_pass::{ForwardPass, ForwardTextureViews},
        render_common,
        texture::DepthTexture,
    },
    scene_graph::{Material, ObjectId, Scene},
};

pub struct Renderer {
    pub window: Arc<Window>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    depth_texture: DepthTexture,
    global_uniform: GlobalUniform,
    forward_pass: ForwardPass,

    meshes: HashMap<MeshKey, MeshBuffers>,
    nodes: HashMap<ObjectId, NodeDraw>,
    fallback_material: Material,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        viewport: Viewport,
        camera: &Camera,
        fallback_material: Material,
    ) -> anyhow::Result<Renderer> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No compatible graphics adapter")?;

        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        let config = render_common::surface_config(&adapter, &surface, viewport);
        surface.configure(&device, &config);

        let depth_texture = DepthTexture::new(&device, &config, "Depth Texture");
        let global_uniform = GlobalUniform::new(
            &device,
            GlobalUniformState::new(camera, &LightingState::default()),
        );
        let forward_pass = ForwardPass::create(&device, config.format, &global_uniform);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_texture,
            global_uniform,
            forward_pass,
            meshes: HashMap::new(),
            nodes: HashMap::new(),
            fallback_material,
        })
    }

    /// Reconfigures the surface if `viewport` differs from its current size.
    pub fn resize(&mut self, viewport: Viewport) {
        if !render_common::apply_viewport(&mut self.config, viewport) {
            return;
        }

        log::debug!("Reconfiguring surface to {}x{}", self.config.width, self.config.height);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture.resize(&self.device, &self.config);
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Uploads meshes not yet on the GPU, refreshes per-node uniforms and
    /// drops buffers no live node uses. Nodes instancing the same mesh share
    /// its vertex and index buffers.
    pub fn sync_scene(&mut self, scene: &Scene) {
        let DrawList { meshes, nodes } = DrawList::gather(scene);

        for (key, mesh) in meshes {
            self.meshes.entry(key).or_insert_with(|| {
                log::debug!("Uploading mesh {} ({} primitives)", mesh.name, mesh.primitives.len());
                MeshBuffers::new(&self.device, mesh, &self.fallback_material)
            });
        }

        let mut live_nodes = HashSet::new();
        let mut live_meshes = HashSet::new();

        for (id, key) in nodes {
            let (Some(object), Some(mesh)) = (scene.get_object(id), self.meshes.get(&key)) else {
                continue;
            };

            let node = self.nodes.entry(id).or_insert_with(|| {
                NodeDraw::new(&self.device, &self.forward_pass.draw_bind_group_layout, key, mesh)
            });
            node.update(&self.queue, &object.transform, mesh);

            live_nodes.insert(id);
            live_meshes.insert(key);
        }

        self.nodes.retain(|id, _| live_nodes.contains(id));

        let before = self.meshes.len();
        self.meshes.retain(|key, _| live_meshes.contains(key));
        if self.meshes.len() != before {
            log::debug!("Released {} GPU mesh(es)", before - self.meshes.len());
        }
    }

    pub fn render(
        &mut self,
        camera: &Camera,
        lighting: &LightingState,
    ) -> Result<(), wgpu::SurfaceError> {
        self.global_uniform
            .update(&self.queue, GlobalUniformState::new(camera, lighting));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.forward_pass.render(
            &ForwardTextureViews {
                color: &view,
                depth: self.depth_texture.view(),
            },
            &mut encoder,
            &self.global_uniform,
            self.nodes
                .values()
                .filter_map(|node| self.meshes.get(&node.mesh).map(|mesh| (mesh, node))),
        );

        self.queue.submit([encoder.finish()]);
        output.present();

        Ok(())
    }

    /// Renders a frame, recovering from a lost or outdated surface. Returns
    /// `false` on an unrecoverable error.
    pub fn render_or_recover(&mut self, camera: &Camera, lighting: &LightingState) -> bool {
        match self.render(camera, lighting) {
            Ok(()) => true,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.reconfigure();
                true
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory");
                false
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timeout");
                true
            }
            Err(other) => {
                log::error!("Unexpected error: {:?}", other);
                true
            }
        }
    }
}
