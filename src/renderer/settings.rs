//! Renderer settings.
//!
//! [`RenderSettings`] is consumed once by [`Renderer::init`](super::Renderer::init)
//! to create the GPU context and size the forward pass resources.
//!
//! | Field              | Description                         | Default           |
//! |--------------------|-------------------------------------|-------------------|
//! | `power_preference` | GPU adapter selection strategy      | `HighPerformance` |
//! | `vsync`            | Vertical sync                       | `true`            |
//! | `clear_color`      | Framebuffer clear color             | dark grey         |
//! | `msaa_samples`     | Multisample count (1 disables MSAA) | `4`               |
//! | `shadow_map_size`  | Edge length of each shadow layer    | `1024`            |
//! | `max_pixel_ratio`  | Cap for the HiDPI scale factor      | `2.0`             |
//! | `depth_format`     | Depth buffer format                 | `Depth32Float`    |

/// Spotlights the forward pass can shade at once.
pub const MAX_SPOT_LIGHTS: usize = 4;

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub power_preference: wgpu::PowerPreference,
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
    pub vsync: bool,
    pub clear_color: wgpu::Color,
    pub msaa_samples: u32,
    pub shadow_map_size: u32,
    pub max_pixel_ratio: f32,
    pub depth_format: wgpu::TextureFormat,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
            vsync: true,
            clear_color: wgpu::Color {
                r: 0.05,
                g: 0.05,
                b: 0.05,
                a: 1.0,
            },
            msaa_samples: 4,
            shadow_map_size: 1024,
            max_pixel_ratio: 2.0,
            depth_format: wgpu::TextureFormat::Depth32Float,
        }
    }
}

impl RenderSettings {
    /// Clamps the sample count to what every backend supports (1 or 4).
    #[must_use]
    pub fn effective_msaa_samples(&self) -> u32 {
        if self.msaa_samples >= 4 { 4 } else { 1 }
    }

    /// Pixel ratio actually used for a display `scale_factor`.
    #[must_use]
    pub fn pixel_ratio(&self, scale_factor: f32) -> f32 {
        scale_factor.clamp(1.0, self.max_pixel_ratio.max(1.0))
    }

    /// Surface size for a window of `width` x `height` physical pixels at
    /// `scale_factor`, rescaled to the capped pixel ratio.
    #[must_use]
    pub fn drawing_buffer_size(&self, width: u32, height: u32, scale_factor: f32) -> (u32, u32) {
        if width == 0 || height == 0 || scale_factor <= 0.0 {
            return (width, height);
        }
        let ratio = self.pixel_ratio(scale_factor) / scale_factor;
        let scale = |v: u32| ((v as f32 * ratio).round() as u32).max(1);
        (scale(width), scale(height))
    }
}
