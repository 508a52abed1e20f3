//! Avatar Stage Tests
//!
//! Tests for:
//! - Static composition (ground and four lights) with and without an avatar
//! - Avatar attach policy and replacement
//! - Animation selection and filtering
//! - Light animator ranges
//! - Resize propagation to camera and renderer
//!
//! None of these need a GPU: the engine records sizes and scene state
//! without a device.

mod common;

use std::time::Duration;

use anyhow::Result;
use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;

use avatar_stage::assets::GltfLoader;
use avatar_stage::engine::Engine;
use avatar_stage::errors::StageError;
use avatar_stage::resources::{Material, Texture};
use avatar_stage::scene::Mesh;
use avatar_stage::stage::config::{AvatarPolicy, LightAnimationConfig};
use avatar_stage::stage::{AssetState, AvatarStage, LightAnimator, StageConfig, apply_avatar_policy};

fn seeded_config() -> StageConfig {
    let mut config = StageConfig::default();
    config.light_animation.seed = Some(1234);
    config
}

fn stage() -> (Engine, AvatarStage) {
    let mut engine = Engine::default();
    let stage = AvatarStage::new(&mut engine, seeded_config());
    (engine, stage)
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn empty_stage_has_four_lights_and_a_ground() {
    let (engine, stage) = stage();
    assert_eq!(engine.scene.light_count(), 4);
    assert_eq!(engine.scene.meshes().count(), 1);
    assert_eq!(stage.layout().spotlights.len(), 3);
    assert_eq!(stage.layout().lights().len(), 4);
    assert_eq!(engine.scene.active_camera(), Some(stage.layout().camera));
    assert!(stage.avatar().is_none());
}

#[test]
fn ground_receives_but_does_not_cast_shadows() {
    let (engine, stage) = stage();
    let ground = engine.scene.mesh(stage.layout().ground).unwrap();
    assert!(ground.receive_shadow);
    assert!(!ground.cast_shadow);
}

#[test]
fn key_light_matches_config() {
    let (engine, stage) = stage();
    let key = engine.scene.light(stage.layout().key_light).unwrap();
    assert_eq!(key.angle, 0.5);
    assert_eq!(key.penumbra, 0.1);
    assert_eq!(key.decay, 1.0);
    assert_eq!(key.distance, 0.0);
    assert_eq!(key.shadow.bias, -0.001);
    assert!(key.cast_shadows);

    let position = engine.scene.get_node(stage.layout().key_light).unwrap().transform.position;
    assert_eq!(position, Vec3::new(1.0, 3.0, 2.0));
}

#[test]
fn failed_loads_leave_the_stage_intact() {
    let mut engine = Engine::default();
    let mut config = seeded_config();
    config.model_url = "definitely/missing/model.glb".into();
    config.animation_url = "definitely/missing/dance.glb".into();
    let mut stage = AvatarStage::new(&mut engine, config);
    stage.start_loading(&engine.assets);
    assert_eq!(stage.model_state(), &AssetState::Loading);

    for _ in 0..500 {
        stage.poll_loads(&mut engine.scene, &mut engine.assets);
        if stage.model_state() != &AssetState::Loading && stage.animation_state() != &AssetState::Loading {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    assert!(matches!(stage.model_state(), AssetState::Failed(_)));
    assert!(matches!(stage.animation_state(), AssetState::Failed(_)));
    assert_eq!(engine.scene.light_count(), 4);
    assert_eq!(engine.scene.meshes().count(), 1);
}

// ============================================================================
// Avatar
// ============================================================================

#[test]
fn attached_avatar_casts_and_receives_shadows() {
    let (mut engine, mut stage) = stage();
    let asset = GltfLoader::from_slice("avatar", &common::avatar_gltf(false)).unwrap();
    let root = stage
        .attach_avatar(&mut engine.scene, &mut engine.assets, asset)
        .unwrap();

    assert_eq!(stage.avatar(), Some(root));
    assert!(stage.mixer().group().contains(root));
    assert_eq!(engine.scene.light_count(), 4);

    let body = engine.scene.find_by_name(root, "Body").unwrap();
    let mesh = engine.scene.mesh(body).unwrap();
    assert!(mesh.cast_shadow && mesh.receive_shadow);
    let material = engine.assets.material(mesh.material).unwrap();
    assert_eq!(material.env_map_intensity, 0.3);
}

#[test]
fn attaching_again_replaces_the_previous_avatar() -> Result<()> {
    let (mut engine, mut stage) = stage();
    // the ground's own geometry and material
    let base_geometries = engine.assets.geometry_count();
    let base_materials = engine.assets.material_count();

    let first = stage.attach_avatar(
        &mut engine.scene,
        &mut engine.assets,
        GltfLoader::from_slice("first", &common::avatar_gltf(false))?,
    )?;
    let mut latest = first;
    for name in ["second", "third"] {
        latest = stage.attach_avatar(
            &mut engine.scene,
            &mut engine.assets,
            GltfLoader::from_slice(name, &common::avatar_gltf(false))?,
        )?;
        assert_eq!(engine.assets.geometry_count(), base_geometries + 1);
        assert_eq!(engine.assets.material_count(), base_materials + 1);
    }

    assert!(!engine.scene.contains(first));
    assert!(engine.scene.contains(latest));
    assert_eq!(stage.mixer().group().roots(), &[latest]);
    // ground plus one avatar body
    assert_eq!(engine.scene.meshes().count(), 2);
    Ok(())
}

#[test]
fn hair_materials_keep_mipmaps() {
    let mut engine = Engine::default();
    let root = engine.scene.create_node_with_name("Avatar");

    let mut make_mesh = |name: &str| {
        let texture = engine.assets.add_texture(Texture::solid_color(name, [255, 255, 255, 255]));
        if let Some(t) = engine.assets.texture_mut(texture) {
            t.set_generate_mipmaps(true);
        }
        let mut material = Material::new_standard(Vec3::ONE.extend(1.0)).with_name(name);
        material.map = Some(texture);
        let material = engine.assets.add_material(material);
        let geometry = engine
            .assets
            .add_geometry(avatar_stage::resources::primitives::create_circle(1.0, 8));
        (Mesh::new(geometry, material), texture)
    };
    let (skin_mesh, skin_texture) = make_mesh("Body_Skin");
    let (hair_mesh, hair_texture) = make_mesh("Hair_Long");
    let (tied_mesh, tied_texture) = make_mesh("ponytail_hair");

    engine.scene.build_node("Body").with_parent(root).with_mesh(skin_mesh).build();
    engine.scene.build_node("Hair").with_parent(root).with_mesh(hair_mesh).build();
    engine.scene.build_node("Tail").with_parent(root).with_mesh(tied_mesh).build();

    apply_avatar_policy(&mut engine.scene, &mut engine.assets, root, &AvatarPolicy::default());

    assert!(!engine.assets.texture(skin_texture).unwrap().generate_mipmaps);
    // the marker is case sensitive
    assert!(!engine.assets.texture(hair_texture).unwrap().generate_mipmaps);
    assert!(engine.assets.texture(tied_texture).unwrap().generate_mipmaps);
}

// ============================================================================
// Animation
// ============================================================================

#[test]
fn animation_is_filtered_and_played() {
    let (mut engine, mut stage) = stage();
    stage
        .attach_avatar(
            &mut engine.scene,
            &mut engine.assets,
            GltfLoader::from_slice("avatar", &common::avatar_gltf(false)).unwrap(),
        )
        .unwrap();

    let dance = GltfLoader::from_slice("dance", &common::avatar_gltf(true)).unwrap();
    let handle = stage.set_animation(&engine.scene, dance).unwrap();

    let action = stage.mixer().action(handle).unwrap();
    assert!(action.is_running());
    assert_eq!(
        action.clip().track_names(),
        vec!["mixamorigHips.position", "mixamorigHips.quaternion"]
    );
    assert_eq!(action.bindings.len(), 2);
}

#[test]
fn animation_before_avatar_binds_on_attach() {
    let (mut engine, mut stage) = stage();
    let dance = GltfLoader::from_slice("dance", &common::avatar_gltf(true)).unwrap();
    let handle = stage.set_animation(&engine.scene, dance).unwrap();
    assert!(stage.mixer().action(handle).unwrap().bindings.is_empty());

    stage
        .attach_avatar(
            &mut engine.scene,
            &mut engine.assets,
            GltfLoader::from_slice("avatar", &common::avatar_gltf(false)).unwrap(),
        )
        .unwrap();
    assert_eq!(stage.mixer().action(handle).unwrap().bindings.len(), 2);
}

#[test]
fn new_animation_replaces_the_running_action() -> Result<()> {
    let (mut engine, mut stage) = stage();
    stage.attach_avatar(
        &mut engine.scene,
        &mut engine.assets,
        GltfLoader::from_slice("avatar", &common::avatar_gltf(false))?,
    )?;

    let first = stage.set_animation(&engine.scene, GltfLoader::from_slice("dance", &common::avatar_gltf(true))?)?;
    let second = stage.set_animation(&engine.scene, GltfLoader::from_slice("encore", &common::avatar_gltf(true))?)?;

    assert_eq!(first, second);
    assert_eq!(stage.mixer().actions().len(), 1);
    let action = stage.mixer().action(second).expect("action");
    assert!(action.is_running());
    assert_eq!(action.time, 0.0);
    assert_eq!(action.bindings.len(), 2);
    Ok(())
}

#[test]
fn file_without_clips_is_missing_animation() {
    let (engine, mut stage) = stage();
    let no_clips = GltfLoader::from_slice("static", &common::avatar_gltf(false)).unwrap();
    let result = stage.set_animation(&engine.scene, no_clips);
    assert!(matches!(result, Err(StageError::MissingAnimation(_))));
}

// ============================================================================
// Lights
// ============================================================================

#[test]
fn tweened_cones_land_in_range() {
    let (mut engine, stage) = stage();
    let config = LightAnimationConfig::default();
    let lights = stage.layout().spotlights.clone();

    for seed in 0..20 {
        let mut animator = LightAnimator::new(lights.clone(), config.clone(), StdRng::seed_from_u64(seed));
        animator.retrigger(&mut engine.scene);
        animator.advance(6.0, &mut engine.scene);
        assert_eq!(animator.active_tweens(), 0);

        for &light in &lights {
            let spot = engine.scene.light(light).unwrap();
            assert!(config.angle.contains(spot.angle), "angle {}", spot.angle);
            assert!(config.penumbra.contains(spot.penumbra), "penumbra {}", spot.penumbra);

            let position = engine.scene.get_node(light).unwrap().transform.position;
            assert!(config.x.contains(position.x));
            assert!(config.y.contains(position.y));
            assert!(config.z.contains(position.z));
        }
    }
}

#[test]
fn key_light_is_never_animated() {
    let (mut engine, stage) = stage();
    let mut animator = LightAnimator::new(
        stage.layout().spotlights.clone(),
        LightAnimationConfig::default(),
        StdRng::seed_from_u64(9),
    );
    for _ in 0..30 {
        animator.update(0.1, &mut engine.scene);
    }
    let key = engine.scene.light(stage.layout().key_light).unwrap();
    assert_eq!(key.angle, 0.5);
    assert_eq!(key.penumbra, 0.1);
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn resize_updates_camera_aspect_and_renderer_size() {
    let (mut engine, stage) = stage();
    engine.resize(1280, 720, 1.0);

    assert_eq!(engine.size(), (1280, 720));
    let camera = engine.scene.camera(stage.layout().camera).unwrap();
    assert!((camera.aspect - 1280.0 / 720.0).abs() < 1e-6);

    engine.resize(300, 900, 2.0);
    assert_eq!(engine.size(), (300, 900));
    let camera = engine.scene.camera(stage.layout().camera).unwrap();
    assert!((camera.aspect - 1.0 / 3.0).abs() < 1e-6);
}

#[test]
fn drawing_buffer_is_capped_by_max_pixel_ratio() {
    let (mut engine, _stage) = stage();
    engine.resize(3000, 1500, 3.0);
    assert_eq!(engine.size(), (3000, 1500));
    assert_eq!(engine.renderer.drawing_buffer_size(), (2000, 1000));
    assert_eq!(engine.renderer.pixel_ratio(), 2.0);

    engine.resize(1280, 720, 1.0);
    assert_eq!(engine.renderer.drawing_buffer_size(), (1280, 720));
}

#[test]
fn zero_height_keeps_previous_aspect() {
    let (mut engine, stage) = stage();
    engine.resize(800, 400, 1.0);
    engine.resize(800, 0, 1.0);
    let camera = engine.scene.camera(stage.layout().camera).unwrap();
    assert!((camera.aspect - 2.0).abs() < 1e-6);
}
