//! Tween Tests
//!
//! Tests for:
//! - Eased interpolation of scalars and vectors
//! - Completion and clamping
//! - Zero-length tweens

use glam::Vec3;

use avatar_stage::tween::{Easing, Tween};

#[test]
fn quadratic_out_front_loads_motion() {
    let mut tween = Tween::new(0.0_f32, 1.0, 2.0, Easing::QuadraticOut);
    let halfway = tween.advance(1.0);
    assert!((halfway - 0.75).abs() < 1e-6);
}

#[test]
fn linear_tracks_progress() {
    let mut tween = Tween::new(10.0_f32, 20.0, 4.0, Easing::Linear);
    assert!((tween.advance(1.0) - 12.5).abs() < 1e-5);
    assert!((tween.progress() - 0.25).abs() < 1e-6);
}

#[test]
fn finishes_exactly_on_target() {
    let mut tween = Tween::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0), 0.5, Easing::QuadraticOut);
    let end = tween.advance(10.0);
    assert!(tween.is_finished());
    assert_eq!(end, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(tween.target(), end);
}

#[test]
fn zero_duration_jumps_to_target() {
    let tween = Tween::new(0.3_f32, 0.7, 0.0, Easing::QuadraticOut);
    assert!(tween.is_finished());
    assert_eq!(tween.value(), 0.7);
}

#[test]
fn negative_dt_does_not_rewind() {
    let mut tween = Tween::new(0.0_f32, 1.0, 1.0, Easing::Linear);
    tween.advance(0.5);
    let value = tween.advance(-1.0);
    assert!((value - 0.5).abs() < 1e-6);
}

#[test]
fn easing_endpoints_are_fixed() {
    for easing in [
        Easing::Linear,
        Easing::QuadraticIn,
        Easing::QuadraticOut,
        Easing::QuadraticInOut,
        Easing::CubicOut,
    ] {
        assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?}");
        assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?}");
    }
}
