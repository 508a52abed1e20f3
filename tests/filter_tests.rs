//! Clip Filter Tests
//!
//! Tests for:
//! - Root position and rotation tracks surviving, everything else dropped
//! - Idempotence
//! - Configurable root bone and prefixed rig names

use glam::{Quat, Vec3};

use avatar_stage::animation::binding::TargetPath;
use avatar_stage::animation::clip::{AnimationClip, Track, TrackData};
use avatar_stage::animation::tracks::{InterpolationMode, KeyframeTrack};
use avatar_stage::animation::{DEFAULT_ROOT_BONE, filter_clip, keeps_track};

fn vec3_track(node: &str, target: TargetPath, end: f32) -> Track {
    Track::new(
        node,
        target,
        TrackData::Vector3(KeyframeTrack::new(
            vec![0.0, end],
            vec![Vec3::ZERO, Vec3::ONE],
            InterpolationMode::Linear,
        )),
    )
}

fn rotation_track(node: &str) -> Track {
    Track::new(
        node,
        TargetPath::Rotation,
        TrackData::Quaternion(KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![Quat::IDENTITY, Quat::from_rotation_y(1.0)],
            InterpolationMode::Linear,
        )),
    )
}

fn dance_clip() -> AnimationClip {
    AnimationClip::new(
        "Dance",
        vec![
            vec3_track("Hips", TargetPath::Translation, 1.0),
            vec3_track("Spine", TargetPath::Scale, 4.0),
            rotation_track("Hand"),
        ],
    )
}

#[test]
fn keeps_root_position_and_rotations_only() {
    let filtered = filter_clip(dance_clip(), DEFAULT_ROOT_BONE);
    assert_eq!(filtered.track_names(), vec!["Hips.position", "Hand.quaternion"]);
}

#[test]
fn name_and_duration_are_preserved() {
    let clip = dance_clip();
    let duration = clip.duration;
    let filtered = filter_clip(clip, DEFAULT_ROOT_BONE);
    assert_eq!(filtered.name, "Dance");
    assert_eq!(filtered.duration, duration);
}

#[test]
fn filtering_is_idempotent() {
    let once = filter_clip(dance_clip(), DEFAULT_ROOT_BONE);
    let twice = filter_clip(once.clone(), DEFAULT_ROOT_BONE);
    assert_eq!(once.track_names(), twice.track_names());
}

#[test]
fn every_surviving_track_has_an_allowed_suffix() {
    let clip = AnimationClip::new(
        "Everything",
        vec![
            vec3_track("mixamorigHips", TargetPath::Translation, 1.0),
            vec3_track("mixamorigHips", TargetPath::Scale, 1.0),
            vec3_track("mixamorigSpine", TargetPath::Translation, 1.0),
            rotation_track("mixamorigSpine"),
            rotation_track("mixamorigHips"),
            vec3_track("HipsTarget", TargetPath::Translation, 1.0),
        ],
    );
    let filtered = filter_clip(clip, DEFAULT_ROOT_BONE);
    for name in filtered.track_names() {
        assert!(
            name.ends_with("Hips.position") || name.ends_with(".quaternion"),
            "unexpected track {name}"
        );
    }
    assert_eq!(filtered.tracks.len(), 3);
}

#[test]
fn root_bone_is_configurable() {
    let clip = AnimationClip::new(
        "Pelvis",
        vec![
            vec3_track("Pelvis", TargetPath::Translation, 1.0),
            vec3_track("Hips", TargetPath::Translation, 1.0),
        ],
    );
    let filtered = filter_clip(clip, "Pelvis");
    assert_eq!(filtered.track_names(), vec!["Pelvis.position"]);
}

#[test]
fn keeps_track_on_raw_names() {
    assert!(keeps_track("Hips.position", "Hips"));
    assert!(keeps_track("Armature|Hand.quaternion", "Hips"));
    assert!(!keeps_track("Spine.position", "Hips"));
    assert!(!keeps_track("Face.morphTargetInfluences", "Hips"));
    assert!(!keeps_track("Hips.scale", "Hips"));
}

#[test]
fn empty_clip_stays_empty() {
    let filtered = filter_clip(AnimationClip::new("Empty", vec![]), DEFAULT_ROOT_BONE);
    assert!(filtered.tracks.is_empty());
}
