use glam::Vec3;

use crate::camera::Camera;
use crate::controls::OrbitControls;
use crate::lighting::LightRig;
use crate::math::AABB;
use crate::scene_graph::{ObjectId, Scene};

/// Extra room around the object so it does not touch the viewport edges.
pub const FIT_MARGIN: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFit {
    /// Camera distance from the origin along +Z.
    pub distance: f32,
    /// World bounds of the object after centering.
    pub bounds: AABB,
}

/// Distance that fits an object of `size` vertically into a field of view of
/// `fov_radians`, never closer than the object's depth, with [`FIT_MARGIN`].
pub fn fit_distance(size: Vec3, fov_radians: f32) -> f32 {
    let vertical = (size.y * 0.5) / (fov_radians * 0.5).tan();
    vertical.max(size.z) * FIT_MARGIN
}

/// Centers `object` at the origin (with its yaw cleared), backs the camera
/// off along +Z until the object fits, and moves the three directional
/// lights to the same distance. The fitted pose becomes the controls'
/// reset state.
///
/// Returns `None`, changing nothing, when the object has no geometry.
pub fn fit_camera_to_object(
    scene: &mut Scene,
    camera: &mut Camera,
    controls: &mut OrbitControls,
    lights: &LightRig,
    object: ObjectId,
) -> Option<CameraFit> {
    if scene.world_bounds(object).is_empty() {
        return None;
    }

    scene.clear_object_yaw(object);
    let bounds = scene.world_bounds(object);
    scene.translate_object(object, -bounds.center());

    let bounds = scene.world_bounds(object);
    let distance = fit_distance(bounds.size(), camera.fov_radians());
    if !distance.is_finite() || distance <= 0.0 {
        log::warn!("Degenerate bounds {:?}, skipping camera fit", bounds);
        return None;
    }

    camera.target = Vec3::ZERO;
    camera.eye = Vec3::new(0.0, 0.0, distance);
    camera.near = camera.near.min(distance * 0.01);
    camera.far = camera.far.max(distance * 10.0);

    controls.min_distance = controls.min_distance.min(distance * 0.1);
    controls.max_distance = controls.max_distance.max(distance * 10.0);
    controls.save_state(camera);

    lights.place(scene, distance);

    log::debug!(
        "Fitted camera at distance {:.3} for bounds size {:?}",
        distance,
        bounds.size()
    );

    Some(CameraFit { distance, bounds })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::{EulerRot, Quat};

    use super::*;
    use crate::config::{CameraConfig, ControlsConfig, LightConfig};
    use crate::scene_graph::{Mesh, NodeKind, Object3D, Primitive, Vertex};

    fn box_mesh(min: Vec3, max: Vec3) -> Arc<Mesh> {
        let vertices = [min, max]
            .into_iter()
            .map(|position| Vertex {
                position,
                normal: Vec3::Y,
            })
            .collect();

        Arc::new(Mesh {
            name: "Box".to_string(),
            primitives: vec![Primitive::new(vertices, Vec::new(), None)],
        })
    }

    struct Rig {
        scene: Scene,
        camera: Camera,
        controls: OrbitControls,
        lights: LightRig,
    }

    fn rig() -> Rig {
        let mut scene = Scene::new();
        let camera = Camera::new(&CameraConfig::default(), 800, 600);
        let controls = OrbitControls::new(&ControlsConfig::default(), &camera);
        let lights = LightRig::spawn(&mut scene, &LightConfig::default());
        Rig {
            scene,
            camera,
            controls,
            lights,
        }
    }

    #[test]
    fn two_unit_cube_fits_at_known_distance() {
        let mut rig = rig();
        let cube = rig.scene.add_object(
            Object3D::new("Cube", NodeKind::Asset)
                .with_mesh(box_mesh(Vec3::splat(-1.0), Vec3::splat(1.0))),
            None,
        );

        let fit = fit_camera_to_object(
            &mut rig.scene,
            &mut rig.camera,
            &mut rig.controls,
            &rig.lights,
            cube,
        )
        .unwrap();

        let expected = 1.5 / (22.5_f32).to_radians().tan();
        assert!((fit.distance - expected).abs() < 1e-4);
        assert!((fit.distance - 3.621_32).abs() < 1e-4);
        assert_eq!(rig.camera.eye, Vec3::new(0.0, 0.0, fit.distance));

        let key = rig.scene.get_object_transform(rig.lights.key).unwrap();
        assert_eq!(key.translation(), Vec3::new(-fit.distance, 0.0, fit.distance));
    }

    #[test]
    fn off_center_object_is_recentered() {
        let mut rig = rig();
        let object = rig.scene.add_object(
            Object3D::new("Offset", NodeKind::Asset)
                .with_mesh(box_mesh(Vec3::new(4.0, 4.0, 4.0), Vec3::new(6.0, 8.0, 5.0))),
            None,
        );
        rig.scene.set_object_rotation(object, Quat::from_euler(EulerRot::YXZ, 0.7, 0.0, 0.0));

        let fit = fit_camera_to_object(
            &mut rig.scene,
            &mut rig.camera,
            &mut rig.controls,
            &rig.lights,
            object,
        )
        .unwrap();

        assert!(fit.bounds.center().length() < 1e-4);
        assert!((fit.bounds.size() - Vec3::new(2.0, 4.0, 1.0)).length() < 1e-4);
        let (yaw, _, _) = rig
            .scene
            .get_object_transform(object)
            .unwrap()
            .rotation()
            .to_euler(EulerRot::YXZ);
        assert!(yaw.abs() < 1e-5);
    }

    #[test]
    fn depth_extent_is_the_floor() {
        // Flat and deep: the vertical term is tiny, so depth wins.
        let distance = fit_distance(Vec3::new(1.0, 0.1, 10.0), 45_f32.to_radians());
        assert!((distance - 15.0).abs() < 1e-4);
    }

    #[test]
    fn tiny_object_widens_near_plane_and_zoom_limit() {
        let mut rig = rig();
        let speck = rig.scene.add_object(
            Object3D::new("Speck", NodeKind::Asset)
                .with_mesh(box_mesh(Vec3::splat(-0.001), Vec3::splat(0.001))),
            None,
        );

        let fit = fit_camera_to_object(
            &mut rig.scene,
            &mut rig.camera,
            &mut rig.controls,
            &rig.lights,
            speck,
        )
        .unwrap();

        assert!(fit.distance < 0.01);
        assert!(rig.camera.near <= fit.distance * 0.01);
        assert!(rig.controls.min_distance <= fit.distance * 0.1);

        rig.controls.update(&mut rig.camera, 0.016);
        assert!((rig.camera.eye - Vec3::new(0.0, 0.0, fit.distance)).length() < 1e-6);
    }

    #[test]
    fn empty_object_changes_nothing() {
        let mut rig = rig();
        let empty = rig
            .scene
            .add_object(Object3D::new("Empty", NodeKind::Asset), None);
        let eye = rig.camera.eye;

        assert!(fit_camera_to_object(
            &mut rig.scene,
            &mut rig.camera,
            &mut rig.controls,
            &rig.lights,
            empty,
        )
        .is_none());
        assert_eq!(rig.camera.eye, eye);
    }

    #[test]
    fn reset_returns_to_fitted_pose() {
        let mut rig = rig();
        let cube = rig.scene.add_object(
            Object3D::new("Cube", NodeKind::Asset)
                .with_mesh(box_mesh(Vec3::splat(-1.0), Vec3::splat(1.0))),
            None,
        );
        let fit = fit_camera_to_object(
            &mut rig.scene,
            &mut rig.camera,
            &mut rig.controls,
            &rig.lights,
            cube,
        )
        .unwrap();

        rig.controls.rotate(glam::Vec2::new(100.0, 20.0));
        rig.controls.update(&mut rig.camera, 0.016);
        rig.controls.reset(&mut rig.camera);

        assert_eq!(rig.camera.eye, Vec3::new(0.0, 0.0, fit.distance));
    }
}
