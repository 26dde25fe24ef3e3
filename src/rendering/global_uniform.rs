use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::lighting::LightingState;

/// Per-frame camera and lighting data, bound at group 0.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GlobalUniformState {
    pub view_proj: Mat4,
    pub eye: Vec4,
    pub ambient: Vec4,
    /// xyz: direction towards the light.
    pub light_directions: [Vec4; 3],
    pub light_colors: [Vec4; 3],
}

impl GlobalUniformState {
    pub fn new(camera: &Camera, lighting: &LightingState) -> Self {
        let mut light_directions = [Vec4::ZERO; 3];
        let mut light_colors = [Vec4::ZERO; 3];
        for (i, (direction, radiance)) in lighting.directional.iter().enumerate() {
            light_directions[i] = direction.extend(0.0);
            light_colors[i] = radiance.extend(1.0);
        }

        Self {
            view_proj: camera.get_vp_matrix(),
            eye: camera.eye.extend(1.0),
            ambient: lighting.ambient.extend(1.0),
            light_directions,
            light_colors,
        }
    }
}

pub struct GlobalUniform {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl GlobalUniform {
    pub fn new(device: &wgpu::Device, initial_state: GlobalUniformState) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Global uniform buffer"),
            contents: bytemuck::cast_slice(&[initial_state]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Global uniform bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global uniform bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, state: GlobalUniformState) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[state]));
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::config::CameraConfig;

    #[test]
    fn state_packs_lights_and_camera() {
        let camera = Camera::new(&CameraConfig::default(), 800, 600);
        let lighting = LightingState {
            ambient: Vec3::splat(0.25),
            directional: [
                (Vec3::X, Vec3::splat(0.75)),
                (Vec3::Y, Vec3::splat(0.5)),
                (Vec3::Z, Vec3::ONE),
            ],
        };

        let state = GlobalUniformState::new(&camera, &lighting);

        assert_eq!(std::mem::size_of::<GlobalUniformState>(), 192);
        assert_eq!(state.eye, Vec4::new(0.0, 0.0, 5.0, 1.0));
        assert_eq!(state.light_directions[1], Vec4::new(0.0, 1.0, 0.0, 0.0));
        assert_eq!(state.light_colors[2].truncate(), Vec3::ONE);
        assert_eq!(state.ambient.truncate(), Vec3::splat(0.25));
    }
}
