//! GPU uniform layouts and the packing of scene data into them.
//!
//! Every struct mirrors a WGSL struct in `shaders/`; fields are plain arrays
//! so the layout does not depend on glam's SIMD settings.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::renderer::settings::MAX_SPOT_LIGHTS;
use crate::resources::{AlphaMode, Material};
use crate::scene::SpotLight;

const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Far plane used for shadow cameras of lights with unlimited range.
pub const SHADOW_FAR_FALLBACK: f32 = 500.0;
const SHADOW_NEAR: f32 = 0.5;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuSpotLight {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub color: [f32; 4],
    pub cone: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    pub params: [u32; 4],
    pub lights: [GpuSpotLight; MAX_SPOT_LIGHTS],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    pub specular: [f32; 4],
    pub params: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub flags: [u32; 4],
}

/// A light as placed in the world for this frame.
#[derive(Debug, Clone, Copy)]
pub struct LightInstance<'a> {
    pub light: &'a SpotLight,
    pub position: Vec3,
    /// Layer in the shadow map array, when the light casts shadows.
    pub shadow_layer: Option<u32>,
}

#[must_use]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[must_use]
pub fn srgb_color_to_linear(color: Vec3) -> Vec3 {
    Vec3::new(srgb_to_linear(color.x), srgb_to_linear(color.y), srgb_to_linear(color.z))
}

/// Perspective shadow camera covering the light's cone.
#[must_use]
pub fn spot_light_view_proj(light: &SpotLight, position: Vec3) -> Mat4 {
    let direction = (light.target - position).normalize_or(Vec3::NEG_Y);
    let up = if direction.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
    let view = Mat4::look_at_rh(position, position + direction, up);

    let fov = (light.angle * 2.0).clamp(0.1, std::f32::consts::PI - 0.01);
    let far = if light.distance > 0.0 { light.distance } else { SHADOW_FAR_FALLBACK };
    let proj = Mat4::perspective_rh(fov, 1.0, SHADOW_NEAR, far.max(SHADOW_NEAR + 0.1));
    proj * view
}

impl GpuSpotLight {
    #[must_use]
    pub fn from_instance(instance: &LightInstance<'_>) -> Self {
        let light = instance.light;
        let direction = (light.target - instance.position).normalize_or(Vec3::NEG_Y);
        let color = srgb_color_to_linear(light.color) * light.intensity;
        let (cos_outer, cos_inner) = light.cone_cosines();
        let layer = instance.shadow_layer.map_or(-1.0, |l| l as f32);

        Self {
            view_proj: if instance.shadow_layer.is_some() {
                spot_light_view_proj(light, instance.position).to_cols_array_2d()
            } else {
                IDENTITY
            },
            position: instance.position.extend(light.distance).to_array(),
            direction: direction.extend(light.decay).to_array(),
            color: color.extend(layer).to_array(),
            cone: [cos_outer, cos_inner, light.shadow.bias, light.shadow.normal_bias],
        }
    }
}

impl FrameUniforms {
    #[must_use]
    pub fn new(
        view_proj: &Mat4,
        camera_position: Vec3,
        ambient: Vec3,
        lights: &[LightInstance<'_>],
        shadow_map_size: u32,
        encode_srgb: bool,
    ) -> Self {
        let mut packed = [GpuSpotLight::zeroed(); MAX_SPOT_LIGHTS];
        let count = lights.len().min(MAX_SPOT_LIGHTS);
        for (slot, instance) in packed.iter_mut().zip(lights) {
            *slot = GpuSpotLight::from_instance(instance);
        }

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_position: camera_position.extend(1.0).to_array(),
            ambient: ambient.extend(1.0).to_array(),
            params: [count as u32, shadow_map_size, u32::from(encode_srgb), 0],
            lights: packed,
        }
    }
}

impl MaterialUniforms {
    #[must_use]
    pub fn from_material(material: &Material) -> Self {
        let (cutoff, mode) = match material.alpha_mode {
            AlphaMode::Opaque => (0.0, 0.0),
            AlphaMode::Mask(cutoff) => (cutoff, 1.0),
            AlphaMode::Blend => (0.0, 2.0),
        };
        let color = srgb_color_to_linear(material.color.truncate()).extend(material.color.w);

        Self {
            color: color.to_array(),
            emissive: material.emissive.extend(material.env_map_intensity).to_array(),
            specular: material.specular_color().extend(material.specular_exponent()).to_array(),
            params: [cutoff, mode, 0.0, 0.0],
        }
    }
}

impl ObjectUniforms {
    #[must_use]
    pub fn new(model: &Mat4, receive_shadow: bool) -> Self {
        let normal_matrix = model.inverse().transpose();
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            flags: [u32::from(receive_shadow), 0, 0, 0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_are_sixteen_byte_multiples() {
        assert_eq!(std::mem::size_of::<GpuSpotLight>(), 128);
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<MaterialUniforms>(), 64);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 144);
    }

    #[test]
    fn frame_packs_at_most_four_lights() {
        let light = SpotLight::from_hex(0xffffff, 1.0);
        let instances: Vec<_> = (0..6)
            .map(|i| LightInstance {
                light: &light,
                position: Vec3::new(i as f32, 3.0, 0.0),
                shadow_layer: None,
            })
            .collect();
        let frame = FrameUniforms::new(&Mat4::IDENTITY, Vec3::ZERO, Vec3::ZERO, &instances, 1024, false);
        assert_eq!(frame.params[0], 4);
        assert_eq!(frame.lights[3].position[0], 3.0);
        assert_eq!(frame.lights[0].color[3], -1.0);
    }

    #[test]
    fn shadow_camera_sees_the_target() {
        let mut light = SpotLight::from_hex(0xffffff, 1.0);
        light.angle = 0.5;
        let view_proj = spot_light_view_proj(&light, Vec3::new(1.0, 3.0, 2.0));
        let clip = view_proj * light.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
