//! Per-frame extraction of draw items and lights from the scene.

use glam::{Mat4, Vec3};

use crate::assets::AssetServer;
use crate::renderer::settings::MAX_SPOT_LIGHTS;
use crate::renderer::uniforms::LightInstance;
use crate::resources::{GeometryHandle, MaterialHandle, Side};
use crate::scene::{NodeHandle, Scene, SkeletonKey};

/// One mesh to draw this frame.
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub node: NodeHandle,
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    /// Identity for skinned meshes, whose vertices are skinned into world space.
    pub model: Mat4,
    pub skeleton: Option<SkeletonKey>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub double_sided: bool,
    pub transparent: bool,
    /// Squared distance from the camera, for back-to-front sorting.
    pub view_depth: f32,
}

/// Collects visible meshes whose geometry and material exist, opaque ones
/// first, transparent ones sorted back to front.
#[must_use]
pub fn extract_draws(scene: &Scene, assets: &AssetServer, camera_position: Vec3) -> Vec<DrawItem> {
    let mut opaque = Vec::new();
    let mut transparent = Vec::new();

    for (node_handle, mesh) in scene.meshes() {
        let Some(node) = scene.get_node(node_handle) else {
            continue;
        };
        if !node.visible {
            continue;
        }
        let Some(geometry) = assets.geometry(mesh.geometry) else {
            continue;
        };
        let Some(material) = assets.material(mesh.material) else {
            continue;
        };

        let skeleton = scene
            .skin(node_handle)
            .map(|skin| skin.skeleton)
            .filter(|&key| geometry.is_skinned() && scene.skeleton(key).is_some());
        let model = if skeleton.is_some() {
            Mat4::IDENTITY
        } else {
            node.transform.world_matrix_as_mat4()
        };

        let center = geometry
            .bounds()
            .map_or(Vec3::ZERO, |b| b.transform(node.world_matrix()).center());

        let item = DrawItem {
            node: node_handle,
            geometry: mesh.geometry,
            material: mesh.material,
            model,
            skeleton,
            cast_shadow: mesh.cast_shadow,
            receive_shadow: mesh.receive_shadow,
            double_sided: material.side == Side::Double,
            transparent: material.is_transparent(),
            view_depth: center.distance_squared(camera_position),
        };
        if item.transparent {
            transparent.push(item);
        } else {
            opaque.push(item);
        }
    }

    transparent.sort_by(|a, b| b.view_depth.total_cmp(&a.view_depth));
    opaque.extend(transparent);
    opaque
}

/// Lights in world space, capped to what the forward pass shades. Shadow
/// layers are handed out in order to shadow-casting lights.
#[must_use]
pub fn extract_lights(scene: &Scene) -> Vec<LightInstance<'_>> {
    let mut next_layer = 0u32;
    scene
        .lights()
        .filter(|(handle, _)| scene.get_node(*handle).is_some_and(|n| n.visible))
        .take(MAX_SPOT_LIGHTS)
        .map(|(handle, light)| {
            let position = scene
                .get_node(handle)
                .map_or(Vec3::ZERO, |n| n.transform.world_position());
            let shadow_layer = light.cast_shadows.then(|| {
                let layer = next_layer;
                next_layer += 1;
                layer
            });
            LightInstance {
                light,
                position,
                shadow_layer,
            }
        })
        .collect()
}
