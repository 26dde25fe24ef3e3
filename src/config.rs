use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Tunables for a viewer session. Every field has a default, so a config
/// file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub lights: LightConfig,
    pub controls: ControlsConfig,
    pub loader: LoaderConfig,
}

impl ViewerConfig {
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        toml::from_str(source).context("Failed to parse viewer config")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read viewer config {}", path.display()))?;
        Self::from_toml_str(&source)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the origin along +Z before anything is loaded.
    pub initial_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.01,
            far: 1000.0,
            initial_distance: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub ambient_intensity: f32,
    pub key_intensity: f32,
    pub fill_intensity: f32,
    pub back_intensity: f32,
    /// Offset of the directional lights from the origin until the first fit.
    pub initial_offset: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.25,
            key_intensity: 0.75,
            fill_intensity: 0.5,
            back_intensity: 1.0,
            initial_offset: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_zoom: bool,
    pub auto_rotate: bool,
    /// Radians per second while auto-rotating.
    pub auto_rotate_speed: f32,
    /// Radians per pixel of pointer drag.
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Fraction of the remaining motion kept each frame. Zero disables damping.
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_zoom: true,
            auto_rotate: false,
            auto_rotate_speed: 0.5,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            damping: 0.75,
            min_distance: 0.01,
            max_distance: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Linear RGB of the material applied to primitives that lack one.
    pub fallback_color: Vec3,
    /// Delay of the second resize pass after a resize or fullscreen change.
    #[serde(with = "millis")]
    pub resize_recheck_delay: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fallback_color: Vec3::splat(0.6),
            resize_recheck_delay: Duration::from_millis(300),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
