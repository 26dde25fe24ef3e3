use glam::Vec3;

use crate::config::LightConfig;
use crate::scene_graph::{NodeKind, Object3D, ObjectId, Scene, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    /// Shines from the node's position towards the origin.
    Directional,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
}

impl Light {
    pub fn ambient(intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color: Vec3::ONE,
            intensity,
        }
    }

    pub fn directional(intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            color: Vec3::ONE,
            intensity,
        }
    }

    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

/// Key/fill/back three-point rig plus an ambient term, all living as scene nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightRig {
    pub key: ObjectId,
    pub fill: ObjectId,
    pub back: ObjectId,
    pub ambient: ObjectId,
}

/// Per-frame snapshot of the rig, in the shape the shader consumes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightingState {
    pub ambient: Vec3,
    /// (direction towards the light, radiance)
    pub directional: [(Vec3, Vec3); 3],
}

impl LightRig {
    pub fn spawn(scene: &mut Scene, config: &LightConfig) -> Self {
        let mut spawn = |name: &str, light: Light| {
            scene.add_object(
                Object3D::new(name, NodeKind::Light)
                    .with_transform(Transform::default())
                    .with_light(light),
                None,
            )
        };

        let rig = Self {
            key: spawn("Key light", Light::directional(config.key_intensity)),
            fill: spawn("Fill light", Light::directional(config.fill_intensity)),
            back: spawn("Back light", Light::directional(config.back_intensity)),
            ambient: spawn("Ambient light", Light::ambient(config.ambient_intensity)),
        };

        rig.place(scene, config.initial_offset);
        rig
    }

    /// Key light front-left, fill front-right, back light behind, all at `distance`.
    pub fn place(&self, scene: &mut Scene, distance: f32) {
        let [key, fill, back] = Self::positions(distance);
        scene.set_object_translation(self.key, key);
        scene.set_object_translation(self.fill, fill);
        scene.set_object_translation(self.back, back);
    }

    pub fn positions(distance: f32) -> [Vec3; 3] {
        [
            Vec3::new(-distance, 0.0, distance),
            Vec3::new(distance, 0.0, distance),
            Vec3::new(distance, 0.0, -distance),
        ]
    }

    pub fn ids(&self) -> [ObjectId; 4] {
        [self.key, self.fill, self.back, self.ambient]
    }

    pub fn state(&self, scene: &Scene) -> LightingState {
        let light_of = |id: ObjectId| {
            scene
                .get_object(id)
                .and_then(|object| object.light.map(|light| (object, light)))
        };

        let ambient = light_of(self.ambient)
            .map(|(_, light)| light.radiance())
            .unwrap_or(Vec3::ZERO);

        let directional = [self.key, self.fill, self.back].map(|id| {
            light_of(id)
                .map(|(object, light)| {
                    let direction = object.transform.translation().normalize_or_zero();
                    (direction, light.radiance())
                })
                .unwrap_or((Vec3::ZERO, Vec3::ZERO))
        });

        LightingState {
            ambient,
            directional,
        }
    }
}
