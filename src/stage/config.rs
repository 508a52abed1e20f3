//! Stage configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields the stock stage: a white key light, three colored spotlights
//! wandering over the avatar, and a small round floor.

use std::path::Path;

use glam::Vec3;
use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::renderer::settings::RenderSettings;
use crate::tween::Easing;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub title: String,
    pub model_url: String,
    pub animation_url: String,
    /// Bone whose position track survives clip filtering.
    pub root_bone: String,
    pub camera: CameraConfig,
    pub ground: GroundConfig,
    pub key_light: SpotLightConfig,
    pub spotlights: Vec<SpotLightConfig>,
    pub light_animation: LightAnimationConfig,
    pub avatar: AvatarPolicy,
    pub render: RenderConfig,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            title: "Avatar Stage".into(),
            model_url: "textures/model.glb".into(),
            animation_url: "textures/model-dance.glb".into(),
            root_bone: crate::animation::DEFAULT_ROOT_BONE.into(),
            camera: CameraConfig::default(),
            ground: GroundConfig::default(),
            key_light: SpotLightConfig::key_light(),
            spotlights: vec![
                SpotLightConfig::colored(0xff7f00, Vec3::new(1.5, 5.0, 4.5)),
                SpotLightConfig::colored(0x00ff7f, Vec3::new(0.0, 5.0, 3.5)),
                SpotLightConfig::colored(0x7f00ff, Vec3::new(-1.5, 5.0, 4.5)),
            ],
            light_animation: LightAnimationConfig::default(),
            avatar: AvatarPolicy::default(),
            render: RenderConfig::default(),
        }
    }
}

impl StageConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded stage config from {}", path.display());
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view, degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// Orbit center.
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.5, 2.0, 2.0),
            target: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub radius: f32,
    pub segments: u32,
    /// `0xRRGGBB`.
    pub color: u32,
    pub shininess: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            radius: 4.0,
            segments: 60,
            color: 0xffffff,
            shininess: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotLightConfig {
    /// `0xRRGGBB`.
    pub color: u32,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    /// Cone half-angle, radians.
    pub angle: f32,
    pub penumbra: f32,
    pub decay: f32,
    pub distance: f32,
    pub cast_shadow: bool,
    pub shadow_bias: f32,
}

impl Default for SpotLightConfig {
    fn default() -> Self {
        Self::colored(0xffffff, Vec3::new(0.0, 5.0, 0.0))
    }
}

impl SpotLightConfig {
    /// The static white light.
    #[must_use]
    pub fn key_light() -> Self {
        Self {
            color: 0xf6f6f6,
            intensity: 1.0,
            position: Vec3::new(1.0, 3.0, 2.0),
            target: Vec3::ZERO,
            angle: 0.5,
            penumbra: 0.1,
            decay: 1.0,
            distance: 0.0,
            cast_shadow: true,
            shadow_bias: -0.001,
        }
    }

    /// One of the animated colored lights.
    #[must_use]
    pub fn colored(color: u32, position: Vec3) -> Self {
        Self {
            color,
            intensity: 10.0,
            position,
            target: Vec3::ZERO,
            angle: 0.3,
            penumbra: 0.2,
            decay: 2.0,
            distance: 50.0,
            cast_shadow: true,
            shadow_bias: 0.0,
        }
    }
}

/// Half-open range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample in the range; an empty range yields `min`.
    pub fn sample(&self, rng: &mut impl RngExt) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..self.max)
        } else {
            self.min
        }
    }

    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value < self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightAnimationConfig {
    /// Time between re-triggers, milliseconds.
    pub interval_ms: f32,
    pub angle: Span,
    pub penumbra: Span,
    pub x: Span,
    pub y: Span,
    pub z: Span,
    /// Tween duration range, milliseconds.
    pub duration_ms: Span,
    pub easing: Easing,
    /// Fixed seed for reproducible light motion.
    pub seed: Option<u64>,
}

impl Default for LightAnimationConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500.0,
            angle: Span::new(0.1, 0.8),
            penumbra: Span::new(1.0, 2.0),
            x: Span::new(-1.5, 1.5),
            y: Span::new(1.5, 2.5),
            z: Span::new(-1.5, 1.5),
            duration_ms: Span::new(2000.0, 5000.0),
            easing: Easing::QuadraticOut,
            seed: None,
        }
    }
}

/// Adjustments applied to every mesh of an attached avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarPolicy {
    pub env_map_intensity: f32,
    /// Materials whose name contains this keep mipmaps on their color map.
    pub hair_marker: String,
}

impl Default for AvatarPolicy {
    fn default() -> Self {
        Self {
            env_map_intensity: 0.3,
            hair_marker: "hair".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Linear RGBA.
    pub clear_color: [f64; 4],
    pub shadow_map_size: u32,
    pub vsync: bool,
    pub msaa_samples: u32,
    pub max_pixel_ratio: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let defaults = RenderSettings::default();
        let c = defaults.clear_color;
        Self {
            clear_color: [c.r, c.g, c.b, c.a],
            shadow_map_size: defaults.shadow_map_size,
            vsync: defaults.vsync,
            msaa_samples: defaults.msaa_samples,
            max_pixel_ratio: defaults.max_pixel_ratio,
        }
    }
}

impl RenderConfig {
    #[must_use]
    pub fn to_render_settings(&self) -> RenderSettings {
        let [r, g, b, a] = self.clear_color;
        RenderSettings {
            clear_color: wgpu::Color { r, g, b, a },
            shadow_map_size: self.shadow_map_size,
            vsync: self.vsync,
            msaa_samples: self.msaa_samples,
            max_pixel_ratio: self.max_pixel_ratio,
            ..RenderSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn empty_span_yields_min() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Span::new(2.0, 2.0).sample(&mut rng), 2.0);
    }

    #[test]
    fn span_samples_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let span = Span::new(-1.5, 1.5);
        for _ in 0..200 {
            assert!(span.contains(span.sample(&mut rng)));
        }
    }
}
