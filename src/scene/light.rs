use glam::Vec3;

/// Shadow map parameters for a light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowConfig {
    /// Depth bias applied when comparing against the shadow map.
    pub bias: f32,
    pub normal_bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            bias: 0.0,
            normal_bias: 0.0,
        }
    }
}

/// Cone light positioned by its node and aimed at `target` (world space).
///
/// Attenuation follows the usual physically based falloff: intensity is
/// divided by `distance^decay`, and when `distance` is non-zero the light
/// fades smoothly to zero at that range.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    pub color: Vec3,
    pub intensity: f32,
    /// Half-angle of the cone, radians.
    pub angle: f32,
    /// Fraction of the cone that fades out. The falloff band runs from
    /// `angle * |1 - penumbra|` to `angle`, so values in `(1, 2)` narrow it
    /// again toward a hard edge.
    pub penumbra: f32,
    pub decay: f32,
    /// Cutoff range; zero means unlimited.
    pub distance: f32,
    pub target: Vec3,
    pub cast_shadows: bool,
    pub shadow: ShadowConfig,
}

impl SpotLight {
    #[must_use]
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            angle: std::f32::consts::FRAC_PI_3,
            penumbra: 0.0,
            decay: 2.0,
            distance: 0.0,
            target: Vec3::ZERO,
            cast_shadows: false,
            shadow: ShadowConfig::default(),
        }
    }

    /// Builds a linear color from a `0xRRGGBB` hex value.
    #[must_use]
    pub fn from_hex(hex: u32, intensity: f32) -> Self {
        Self::new(hex_to_rgb(hex), intensity)
    }

    /// Cosines bounding the smooth falloff: `(outer, inner)`.
    #[must_use]
    pub fn cone_cosines(&self) -> (f32, f32) {
        let outer = self.angle.cos();
        let inner = (self.angle * (1.0 - self.penumbra)).cos();
        (outer, inner)
    }
}

/// Converts `0xRRGGBB` into an sRGB-space color in `[0, 1]`.
#[must_use]
pub fn hex_to_rgb(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    Vec3::new(r, g, b)
}
