use glam::{EulerRot, Mat4, Quat, Vec3};
use std::cell::{Cell, Ref, RefCell};

#[derive(Debug, Clone)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,

    local_matrix: RefCell<Mat4>,
    world_matrix: RefCell<Mat4>,
    normal_matrix: RefCell<Mat4>,
    local_dirty: Cell<bool>,
    world_dirty: Cell<bool>,
    has_changed_since_last_update: Cell<bool>,
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self::from_parts(translation, Quat::IDENTITY, Vec3::ONE)
    }

    pub fn from_parts(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
            local_matrix: RefCell::new(Mat4::IDENTITY),
            world_matrix: RefCell::new(Mat4::IDENTITY),
            normal_matrix: RefCell::new(Mat4::IDENTITY),
            local_dirty: Cell::new(true),
            world_dirty: Cell::new(true),
            has_changed_since_last_update: Cell::new(true),
        }
    }

    pub fn get_local_matrix(&self) -> Ref<'_, Mat4> {
        if self.local_dirty.get() {
            let matrix =
                Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation);

            self.local_matrix.replace(matrix);
            self.local_dirty.set(false);
            self.invalidate_world();
        }

        self.local_matrix.borrow()
    }

    pub fn get_world_matrix(&self) -> Ref<'_, Mat4> {
        self.world_matrix.borrow()
    }

    /// Inverse-transpose of the world matrix, for transforming normals.
    pub fn get_normal_matrix(&self) -> Ref<'_, Mat4> {
        self.normal_matrix.borrow()
    }

    pub fn set_world_matrix(&self, world_matrix: Mat4) {
        self.world_matrix.replace(world_matrix);
        self.world_dirty.set(false);
        self.has_changed_since_last_update.set(true);
        self.normal_matrix
            .replace(world_matrix.inverse().transpose());
    }

    pub fn invalidate_local(&self) {
        self.local_dirty.set(true);
        self.world_dirty.set(true);
        self.has_changed_since_last_update.set(true);
    }

    pub fn invalidate_world(&self) {
        self.world_dirty.set(true);
    }

    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty.get()
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.invalidate_local();
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.invalidate_local();
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.translation += delta;
        self.invalidate_local();
    }

    /// Drops the rotation about the vertical axis, keeping pitch and roll.
    pub fn clear_yaw(&mut self) {
        let (_, pitch, roll) = self.rotation.to_euler(EulerRot::YXZ);
        self.rotation = Quat::from_euler(EulerRot::YXZ, 0.0, pitch, roll);
        self.invalidate_local();
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn reset_flags(&self) {
        self.has_changed_since_last_update.set(false);
    }

    pub fn has_changed(&self) -> bool {
        self.has_changed_since_last_update.get()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_translation(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_yaw_keeps_pitch() {
        let mut transform = Transform::default();
        transform.set_rotation(Quat::from_euler(EulerRot::YXZ, 1.2, 0.3, 0.0));
        transform.clear_yaw();

        let (yaw, pitch, _) = transform.rotation().to_euler(EulerRot::YXZ);
        assert!(yaw.abs() < 1e-5);
        assert!((pitch - 0.3).abs() < 1e-5);
    }

    #[test]
    fn local_matrix_is_recomputed_after_translation() {
        let mut transform = Transform::default();
        assert_eq!(transform.get_local_matrix().w_axis.truncate(), Vec3::ZERO);

        transform.translate(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            transform.get_local_matrix().w_axis.truncate(),
            Vec3::new(1.0, 2.0, 3.0)
        );
        assert!(transform.has_changed());
    }
}
