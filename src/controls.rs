use glam::{Vec2, Vec3};

use crate::camera::Camera;
use crate::config::ControlsConfig;

const MIN_POLAR: f32 = 1e-4;
const MAX_POLAR: f32 = std::f32::consts::PI - 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y.
    phi: f32,
    /// Azimuth around +Y, measured from +Z.
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }

        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SavedState {
    target: Vec3,
    eye: Vec3,
}

/// Orbit-style camera controller: drag to orbit around a target, wheel to
/// dolly, secondary drag to pan. Input only accumulates deltas; they are
/// applied to the camera in [`OrbitControls::update`].
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_zoom: bool,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    rotate_delta: Vec2,
    pan_offset: Vec3,
    scale: f32,
    interacted: bool,
    saved: SavedState,
}

impl OrbitControls {
    pub fn new(config: &ControlsConfig, camera: &Camera) -> Self {
        Self {
            target: camera.target,
            enable_zoom: config.enable_zoom,
            auto_rotate: config.auto_rotate,
            auto_rotate_speed: config.auto_rotate_speed,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            damping: config.damping.clamp(0.0, 0.99),
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            rotate_delta: Vec2::ZERO,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            interacted: false,
            saved: SavedState {
                target: camera.target,
                eye: camera.eye,
            },
        }
    }

    /// The first user interaction turns auto-rotation off for good.
    fn interact(&mut self) {
        if !self.interacted {
            self.interacted = true;
            if self.auto_rotate {
                log::debug!("User interaction, disabling auto-rotate");
                self.auto_rotate = false;
            }
        }
    }

    pub fn has_interacted(&self) -> bool {
        self.interacted
    }

    /// Pointer drag in pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        self.interact();
        self.rotate_delta += delta * self.rotate_speed;
    }

    /// Positive steps dolly in, negative out.
    pub fn zoom(&mut self, steps: f32) {
        self.interact();
        if !self.enable_zoom {
            return;
        }
        self.scale *= (-steps * self.zoom_speed).exp();
    }

    /// Secondary drag in pixels; moves the target in the view plane so the
    /// point under the cursor follows it at the target's depth.
    pub fn pan(&mut self, delta: Vec2, viewport_height: u32, camera: &Camera) {
        self.interact();
        if viewport_height == 0 {
            return;
        }

        let forward = (camera.target - camera.eye).normalize_or_zero();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);

        let visible_height = 2.0 * camera.distance_to_target() * (camera.fov_radians() * 0.5).tan();
        let units_per_pixel = visible_height / viewport_height as f32;

        self.pan_offset += (-right * delta.x + up * delta.y) * units_per_pixel;
    }

    /// Applies pending input and auto-rotation to `camera`. Returns whether
    /// the camera moved.
    pub fn update(&mut self, camera: &mut Camera, dt: f32) -> bool {
        if self.auto_rotate {
            self.rotate_delta.x += self.auto_rotate_speed * dt;
        }

        let mut spherical = Spherical::from_offset(camera.eye - self.target);
        spherical.theta -= self.rotate_delta.x;
        spherical.phi = (spherical.phi - self.rotate_delta.y).clamp(MIN_POLAR, MAX_POLAR);
        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset;

        let eye = self.target + spherical.to_offset();
        let moved = eye.distance_squared(camera.eye) > 1e-12 || camera.target != self.target;

        camera.eye = eye;
        camera.target = self.target;

        if self.damping > 0.0 {
            self.rotate_delta *= self.damping;
            self.pan_offset *= self.damping;
            if self.rotate_delta.length_squared() < 1e-10 {
                self.rotate_delta = Vec2::ZERO;
            }
            if self.pan_offset.length_squared() < 1e-10 {
                self.pan_offset = Vec3::ZERO;
            }
        } else {
            self.rotate_delta = Vec2::ZERO;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        moved
    }

    /// Records the current camera pose as the one [`OrbitControls::reset`] returns to.
    pub fn save_state(&mut self, camera: &Camera) {
        self.target = camera.target;
        self.saved = SavedState {
            target: camera.target,
            eye: camera.eye,
        };
    }

    pub fn reset(&mut self, camera: &mut Camera) {
        self.target = self.saved.target;
        camera.target = self.saved.target;
        camera.eye = self.saved.eye;

        self.rotate_delta = Vec2::ZERO;
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    fn setup(config: ControlsConfig) -> (OrbitControls, Camera) {
        let camera = Camera::new(&CameraConfig::default(), 800, 600);
        let controls = OrbitControls::new(&config, &camera);
        (controls, camera)
    }

    #[test]
    fn spherical_round_trips_offset() {
        let offset = Vec3::new(1.0, 2.0, -3.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).length() < 1e-5);
    }

    #[test]
    fn first_interaction_disables_auto_rotate() {
        let (mut controls, mut camera) = setup(ControlsConfig {
            auto_rotate: true,
            ..Default::default()
        });

        assert!(controls.update(&mut camera, 0.1));
        assert!(controls.auto_rotate);

        controls.rotate(Vec2::new(4.0, 0.0));
        assert!(!controls.auto_rotate);
        assert!(controls.has_interacted());
    }

    #[test]
    fn orbit_keeps_distance_to_target() {
        let (mut controls, mut camera) = setup(ControlsConfig {
            damping: 0.0,
            ..Default::default()
        });

        controls.rotate(Vec2::new(200.0, -80.0));
        controls.update(&mut camera, 0.016);

        assert!((camera.distance_to_target() - 5.0).abs() < 1e-4);
        assert!(camera.eye.x.abs() > 0.1);
    }

    #[test]
    fn zoom_respects_enable_flag_and_limits() {
        let (mut controls, mut camera) = setup(ControlsConfig {
            damping: 0.0,
            min_distance: 2.0,
            ..Default::default()
        });

        controls.zoom(100.0);
        controls.update(&mut camera, 0.016);
        assert!((camera.distance_to_target() - 2.0).abs() < 1e-4);

        controls.enable_zoom = false;
        controls.zoom(-5.0);
        controls.update(&mut camera, 0.016);
        assert!((camera.distance_to_target() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn reset_restores_saved_pose() {
        let (mut controls, mut camera) = setup(ControlsConfig::default());
        let initial_eye = camera.eye;

        controls.rotate(Vec2::new(50.0, 50.0));
        controls.pan(Vec2::new(30.0, 10.0), 600, &camera);
        controls.update(&mut camera, 0.016);
        assert_ne!(camera.eye, initial_eye);

        controls.reset(&mut camera);
        assert_eq!(camera.eye, initial_eye);
        assert_eq!(camera.target, Vec3::ZERO);
        assert!(!controls.update(&mut camera, 0.016));
    }
}
