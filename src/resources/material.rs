use glam::{Vec3, Vec4};

use crate::resources::TextureHandle;

/// Lighting model used by the forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingModel {
    /// Blinn-Phong with explicit shininess.
    Phong,
    /// Metallic-roughness inputs mapped onto the same lighting loop.
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask(f32),
    Blend,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub shading: ShadingModel,
    pub color: Vec4,
    pub map: Option<TextureHandle>,
    pub emissive: Vec3,
    pub shininess: f32,
    pub roughness: f32,
    pub metalness: f32,
    /// Scales the scene's ambient term.
    pub env_map_intensity: f32,
    pub side: Side,
    pub alpha_mode: AlphaMode,
}

impl Material {
    #[must_use]
    pub fn new_phong(color: Vec4) -> Self {
        Self {
            name: String::new(),
            shading: ShadingModel::Phong,
            color,
            map: None,
            emissive: Vec3::ZERO,
            shininess: 30.0,
            roughness: 1.0,
            metalness: 0.0,
            env_map_intensity: 1.0,
            side: Side::Front,
            alpha_mode: AlphaMode::Opaque,
        }
    }

    #[must_use]
    pub fn new_standard(color: Vec4) -> Self {
        Self {
            shading: ShadingModel::Standard,
            ..Self::new_phong(color)
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Specular exponent fed to the shader. Standard materials derive it
    /// from roughness.
    #[must_use]
    pub fn specular_exponent(&self) -> f32 {
        match self.shading {
            ShadingModel::Phong => self.shininess,
            ShadingModel::Standard => {
                let r = self.roughness.clamp(0.04, 1.0);
                (2.0 / (r * r * r * r) - 2.0).clamp(1.0, 2048.0)
            }
        }
    }

    /// Specular color: dielectrics reflect 4% white, metals their base color.
    #[must_use]
    pub fn specular_color(&self) -> Vec3 {
        match self.shading {
            ShadingModel::Phong => Vec3::splat(0.07),
            ShadingModel::Standard => Vec3::splat(0.04).lerp(self.color.truncate(), self.metalness),
        }
    }

    #[must_use]
    pub fn is_transparent(&self) -> bool {
        matches!(self.alpha_mode, AlphaMode::Blend)
    }
}
