//! Animation System Tests
//!
//! Tests for:
//! - KeyframeTrack linear/step interpolation and cursor sampling
//! - AnimationAction loop modes (Once, Loop, PingPong)
//! - AnimationClip duration auto-computation
//! - AnimationMixer binding through the object group

use std::sync::Arc;

use glam::{Quat, Vec3};

use avatar_stage::animation::action::{AnimationAction, LoopMode};
use avatar_stage::animation::binding::TargetPath;
use avatar_stage::animation::clip::{AnimationClip, Track, TrackData};
use avatar_stage::animation::mixer::AnimationMixer;
use avatar_stage::animation::tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
use avatar_stage::scene::{NodeHandle, Scene};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn position_track(node: &str, end: f32) -> Track {
    Track::new(
        node,
        TargetPath::Translation,
        TrackData::Vector3(KeyframeTrack::new(
            vec![0.0, end],
            vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)],
            InterpolationMode::Linear,
        )),
    )
}

fn rig() -> (Scene, NodeHandle, NodeHandle) {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("Avatar");
    let hips = scene.build_node("Hips").with_parent(root).build();
    (scene, root, hips)
}

// ============================================================================
// KeyframeTrack
// ============================================================================

#[test]
fn track_linear_midpoint() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 10.0], InterpolationMode::Linear);
    let mut cursor = KeyframeCursor::default();
    let value = track.sample_with_cursor(0.5, &mut cursor).unwrap();
    assert!(approx(value, 5.0));
}

#[test]
fn track_step_holds_previous_key() {
    let track = KeyframeTrack::new(vec![0.0, 1.0, 2.0], vec![1.0_f32, 2.0, 3.0], InterpolationMode::Step);
    assert!(approx(track.sample(1.9).unwrap(), 2.0));
}

#[test]
fn track_clamps_outside_range() {
    let track = KeyframeTrack::new(vec![1.0, 2.0], vec![4.0_f32, 8.0], InterpolationMode::Linear);
    assert!(approx(track.sample(0.0).unwrap(), 4.0));
    assert!(approx(track.sample(5.0).unwrap(), 8.0));
}

#[test]
fn cursor_sampling_matches_stateless_sampling() {
    let times: Vec<f32> = (0..20).map(|i| i as f32 * 0.1).collect();
    let values: Vec<f32> = (0..20).map(|i| (i * i) as f32).collect();
    let track = KeyframeTrack::new(times, values, InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    for step in 0..40 {
        let t = step as f32 * 0.047;
        let a = track.sample_with_cursor(t, &mut cursor).unwrap();
        let b = track.sample(t).unwrap();
        assert!(approx(a, b), "t={t}: {a} vs {b}");
    }
    // jump backwards
    let a = track.sample_with_cursor(0.15, &mut cursor).unwrap();
    assert!(approx(a, track.sample(0.15).unwrap()));
}

#[test]
fn empty_track_samples_none() {
    let track: KeyframeTrack<f32> = KeyframeTrack::new(vec![], vec![], InterpolationMode::Linear);
    assert!(track.sample(0.0).is_none());
}

// ============================================================================
// AnimationClip
// ============================================================================

#[test]
fn clip_duration_is_latest_key() {
    let clip = AnimationClip::new("Dance", vec![position_track("Hips", 1.5), position_track("Spine", 3.0)]);
    assert!(approx(clip.duration, 3.0));
}

#[test]
fn track_names_use_node_dot_property() {
    let rotation = Track::new(
        "Hand",
        TargetPath::Rotation,
        TrackData::Quaternion(KeyframeTrack::new(vec![0.0], vec![Quat::IDENTITY], InterpolationMode::Linear)),
    );
    let clip = AnimationClip::new("Dance", vec![position_track("Hips", 1.0), rotation]);
    assert_eq!(clip.track_names(), vec!["Hips.position", "Hand.quaternion"]);
}

// ============================================================================
// AnimationAction
// ============================================================================

#[test]
fn action_loop_wraps() {
    let clip = Arc::new(AnimationClip::new("Loop", vec![position_track("Hips", 2.0)]));
    let mut action = AnimationAction::new(clip);
    action.play();
    action.update(2.5);
    assert!(approx(action.time, 0.5));
}

#[test]
fn action_once_stops_at_end() {
    let clip = Arc::new(AnimationClip::new("Once", vec![position_track("Hips", 2.0)]));
    let mut action = AnimationAction::new(clip);
    action.loop_mode = LoopMode::Once;
    action.play();
    action.update(3.0);
    assert!(approx(action.time, 2.0));
    assert!(!action.is_running());
}

#[test]
fn action_ping_pong_reverses() {
    let clip = Arc::new(AnimationClip::new("Bounce", vec![position_track("Hips", 2.0)]));
    let mut action = AnimationAction::new(clip);
    action.loop_mode = LoopMode::PingPong;
    action.play();

    action.update(1.5);
    assert!(approx(action.time, 1.5));
    action.update(1.0);
    assert!(approx(action.time, 1.5));
    action.update(1.0);
    assert!(approx(action.time, 0.5));
}

#[test]
fn action_time_scale_and_pause() {
    let clip = Arc::new(AnimationClip::new("Scaled", vec![position_track("Hips", 4.0)]));
    let mut action = AnimationAction::new(clip);
    action.time_scale = 2.0;
    action.play();
    action.update(0.5);
    assert!(approx(action.time, 1.0));

    action.paused = true;
    action.update(0.5);
    assert!(approx(action.time, 1.0));
}

#[test]
fn action_is_inactive_until_played() {
    let clip = Arc::new(AnimationClip::new("Idle", vec![position_track("Hips", 1.0)]));
    let mut action = AnimationAction::new(clip);
    action.update(0.5);
    assert!(approx(action.time, 0.0));
    assert!(!action.is_running());
}

// ============================================================================
// AnimationMixer
// ============================================================================

#[test]
fn mixer_drives_group_members() {
    let (mut scene, root, hips) = rig();
    let mut mixer = AnimationMixer::new();
    mixer.add_object(&scene, root);

    let clip = Arc::new(AnimationClip::new("Walk", vec![position_track("Hips", 1.0)]));
    let handle = mixer.clip_action(&scene, clip);
    mixer.action_mut(handle).unwrap().play();

    mixer.update(0.5, &mut scene);
    let position = scene.get_node(hips).unwrap().transform.position;
    assert!(position.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-4));
}

#[test]
fn adding_a_model_rebinds_existing_actions() {
    let (mut scene, root, hips) = rig();
    let mut mixer = AnimationMixer::new();

    let clip = Arc::new(AnimationClip::new("Walk", vec![position_track("Hips", 1.0)]));
    let handle = mixer.clip_action(&scene, clip);
    mixer.action_mut(handle).unwrap().play();
    assert!(mixer.action(handle).unwrap().bindings.is_empty());

    mixer.add_object(&scene, root);
    assert_eq!(mixer.action(handle).unwrap().bindings.len(), 1);

    mixer.update(0.25, &mut scene);
    let position = scene.get_node(hips).unwrap().transform.position;
    assert!(approx(position.x, 2.5));
}

#[test]
fn removed_model_is_no_longer_driven() {
    let (mut scene, root, hips) = rig();
    let mut mixer = AnimationMixer::new();
    mixer.add_object(&scene, root);
    let clip = Arc::new(AnimationClip::new("Walk", vec![position_track("Hips", 1.0)]));
    let handle = mixer.clip_action(&scene, clip);
    mixer.action_mut(handle).unwrap().play();

    mixer.remove_object(&scene, root);
    assert!(mixer.group().is_empty());
    mixer.update(0.5, &mut scene);
    assert_eq!(scene.get_node(hips).unwrap().transform.position, Vec3::ZERO);
}

#[test]
fn unmatched_tracks_are_skipped() {
    let (scene, root, _) = rig();
    let mut mixer = AnimationMixer::new();
    mixer.add_object(&scene, root);
    let clip = Arc::new(AnimationClip::new(
        "Mixed",
        vec![position_track("Hips", 1.0), position_track("Tail", 1.0)],
    ));
    let handle = mixer.clip_action(&scene, clip);
    let bindings = &mixer.action(handle).unwrap().bindings;
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].track_index, 0);
}
