//! Stage Configuration Tests
//!
//! Tests for:
//! - Defaults matching the stock stage
//! - Partial JSON overrides
//! - Conversion into renderer settings
//! - Error reporting for malformed files

use glam::Vec3;

use avatar_stage::errors::StageError;
use avatar_stage::stage::StageConfig;
use avatar_stage::tween::Easing;

#[test]
fn defaults_describe_the_stock_stage() {
    let config = StageConfig::default();
    assert_eq!(config.model_url, "textures/model.glb");
    assert_eq!(config.animation_url, "textures/model-dance.glb");
    assert_eq!(config.root_bone, "Hips");

    assert_eq!(config.camera.fov, 75.0);
    assert_eq!(config.camera.position, Vec3::new(0.5, 2.0, 2.0));
    assert_eq!(config.camera.target, Vec3::new(0.0, 1.0, 0.0));

    assert_eq!(config.key_light.color, 0xf6f6f6);
    assert_eq!(config.key_light.shadow_bias, -0.001);
    assert_eq!(config.key_light.decay, 1.0);

    let colors: Vec<u32> = config.spotlights.iter().map(|s| s.color).collect();
    assert_eq!(colors, vec![0xff7f00, 0x00ff7f, 0x7f00ff]);
    for light in &config.spotlights {
        assert_eq!(light.intensity, 10.0);
        assert_eq!(light.angle, 0.3);
        assert_eq!(light.distance, 50.0);
        assert!(light.cast_shadow);
    }

    let anim = &config.light_animation;
    assert_eq!(anim.interval_ms, 500.0);
    assert_eq!((anim.angle.min, anim.angle.max), (0.1, 0.8));
    assert_eq!((anim.penumbra.min, anim.penumbra.max), (1.0, 2.0));
    assert_eq!((anim.duration_ms.min, anim.duration_ms.max), (2000.0, 5000.0));
    assert_eq!(anim.easing, Easing::QuadraticOut);

    assert_eq!(config.avatar.env_map_intensity, 0.3);
    assert_eq!(config.avatar.hair_marker, "hair");
}

#[test]
fn empty_object_yields_defaults() {
    let config = StageConfig::from_json_str("{}").unwrap();
    assert_eq!(config, StageConfig::default());
}

#[test]
fn partial_overrides_keep_other_defaults() {
    let json = r#"{
        "model_url": "avatars/robot.glb",
        "camera": { "fov": 50.0 },
        "light_animation": { "seed": 42, "interval_ms": 250.0 },
        "render": { "msaa_samples": 1 }
    }"#;
    let config = StageConfig::from_json_str(json).unwrap();

    assert_eq!(config.model_url, "avatars/robot.glb");
    assert_eq!(config.animation_url, "textures/model-dance.glb");
    assert_eq!(config.camera.fov, 50.0);
    assert_eq!(config.camera.near, 0.1);
    assert_eq!(config.light_animation.seed, Some(42));
    assert_eq!(config.light_animation.interval_ms, 250.0);
    assert_eq!(config.light_animation.angle.max, 0.8);
    assert_eq!(config.render.msaa_samples, 1);
}

#[test]
fn vectors_and_spans_read_as_arrays_and_objects() {
    let json = r#"{
        "camera": { "position": [1.0, 2.0, 3.0] },
        "light_animation": { "y": { "min": 0.5, "max": 1.0 } }
    }"#;
    let config = StageConfig::from_json_str(json).unwrap();
    assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(config.light_animation.y.min, 0.5);
}

#[test]
fn render_config_maps_onto_settings() {
    let json = r#"{ "render": { "shadow_map_size": 2048, "vsync": false, "clear_color": [1.0, 0.0, 0.0, 1.0] } }"#;
    let settings = StageConfig::from_json_str(json).unwrap().render.to_render_settings();
    assert_eq!(settings.shadow_map_size, 2048);
    assert!(!settings.vsync);
    assert_eq!(settings.clear_color.r, 1.0);
    assert_eq!(settings.effective_msaa_samples(), 4);
}

#[test]
fn malformed_json_is_reported() {
    let result = StageConfig::from_json_str("{ \"camera\": ");
    assert!(matches!(result, Err(StageError::JsonError(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let result = StageConfig::load("definitely/missing/stage.json");
    assert!(matches!(result, Err(StageError::IoError(_))));
}

#[test]
fn config_round_trips_through_json() {
    let config = StageConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(StageConfig::from_json_str(&json).unwrap(), config);
}
