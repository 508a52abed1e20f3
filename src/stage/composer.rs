//! Static stage setup and the policy applied to attached avatars.

use std::f32::consts::FRAC_PI_2;

use crate::assets::AssetServer;
use crate::resources::Material;
use crate::resources::primitives::create_circle;
use crate::scene::{Camera, Mesh, NodeHandle, Scene, SpotLight, hex_to_rgb};
use crate::stage::config::{AvatarPolicy, SpotLightConfig, StageConfig};

/// Handles of the nodes built by [`compose`].
#[derive(Debug, Clone)]
pub struct StageLayout {
    pub camera: NodeHandle,
    pub ground: NodeHandle,
    pub key_light: NodeHandle,
    /// The animated colored lights, in config order.
    pub spotlights: Vec<NodeHandle>,
}

impl StageLayout {
    /// Every light on the stage, key light first.
    #[must_use]
    pub fn lights(&self) -> Vec<NodeHandle> {
        std::iter::once(self.key_light)
            .chain(self.spotlights.iter().copied())
            .collect()
    }
}

/// Builds the camera, the ground disc and the lights.
pub fn compose(scene: &mut Scene, assets: &mut AssetServer, config: &StageConfig, aspect: f32) -> StageLayout {
    let cam = &config.camera;
    let camera = scene
        .build_node("Camera")
        .with_position(cam.position)
        .with_camera(Camera::new_perspective(cam.fov, aspect, cam.near, cam.far))
        .build();
    if let Some(node) = scene.get_node_mut(camera) {
        node.transform.look_at(cam.target, glam::Vec3::Y);
    }
    scene.set_active_camera(Some(camera));

    let ground_cfg = &config.ground;
    let geometry = assets.add_geometry(create_circle(ground_cfg.radius, ground_cfg.segments));
    let mut material = Material::new_phong(hex_to_rgb(ground_cfg.color).extend(1.0)).with_name("Ground");
    material.shininess = ground_cfg.shininess;
    let material = assets.add_material(material);
    let mut ground_mesh = Mesh::new(geometry, material);
    ground_mesh.receive_shadow = true;
    let ground = scene
        .build_node("Ground")
        .with_rotation_euler(-FRAC_PI_2, 0.0, 0.0)
        .with_mesh(ground_mesh)
        .build();

    let key_light = add_spotlight(scene, "Key Light", &config.key_light);
    let spotlights = config
        .spotlights
        .iter()
        .enumerate()
        .map(|(i, light)| add_spotlight(scene, &format!("Spotlight {}", i + 1), light))
        .collect();

    scene.update();

    StageLayout {
        camera,
        ground,
        key_light,
        spotlights,
    }
}

fn add_spotlight(scene: &mut Scene, name: &str, config: &SpotLightConfig) -> NodeHandle {
    let mut light = SpotLight::from_hex(config.color, config.intensity);
    light.angle = config.angle;
    light.penumbra = config.penumbra;
    light.decay = config.decay;
    light.distance = config.distance;
    light.target = config.target;
    light.cast_shadows = config.cast_shadow;
    light.shadow.bias = config.shadow_bias;

    scene
        .build_node(name)
        .with_position(config.position)
        .with_light(light)
        .build()
}

/// Makes every mesh under `root` cast and receive shadows, sets the
/// environment intensity of its material, and turns off mipmaps on color
/// maps of materials not named as hair.
pub fn apply_avatar_policy(scene: &mut Scene, assets: &mut AssetServer, root: NodeHandle, policy: &AvatarPolicy) {
    let mut touched = 0usize;
    for node in scene.traverse(root) {
        let Some(mesh) = scene.mesh_mut(node) else {
            continue;
        };
        mesh.cast_shadow = true;
        mesh.receive_shadow = true;
        let material_handle = mesh.material;
        touched += 1;

        let Some(material) = assets.material_mut(material_handle) else {
            continue;
        };
        material.env_map_intensity = policy.env_map_intensity;
        let keep_mipmaps = material.name.contains(&policy.hair_marker);
        let map = material.map;

        if !keep_mipmaps
            && let Some(texture) = map.and_then(|handle| assets.texture_mut(handle))
        {
            texture.set_generate_mipmaps(false);
        }
    }
    log::debug!("Applied avatar policy to {touched} meshes");
}
