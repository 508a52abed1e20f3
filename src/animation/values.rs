use glam::{Quat, Vec3, Vec4};

/// Values that keyframe tracks and tweens can blend between.
pub trait Interpolatable: Copy + Sized {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;

    /// Cubic Hermite spline between `v0` and `v1`, with tangents scaled by the
    /// keyframe interval `dt`.
    fn interpolate_cubic(
        v0: Self,
        out_tangent0: Self,
        in_tangent1: Self,
        v1: Self,
        t: f32,
        dt: f32,
    ) -> Self;
}

/// Hermite basis weights `(s0, s1, s2, s3)` for value0, tangent0, value1, tangent1.
#[inline]
fn hermite_basis(t: f32) -> (f32, f32, f32, f32) {
    let t2 = t * t;
    let t3 = t2 * t;
    let s2 = -2.0 * t3 + 3.0 * t2;
    let s3 = t3 - t2;
    let s0 = 1.0 - s2;
    let s1 = s3 - t2 + t;
    (s0, s1, s2, s3)
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        s0 * v0 + s1 * out_tangent0 * dt + s2 * v1 + s3 * in_tangent1 * dt
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        v0 * s0 + out_tangent0 * (dt * s1) + v1 * s2 + in_tangent1 * (dt * s3)
    }
}

impl Interpolatable for Quat {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t)
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        let blended = Vec4::from(v0) * s0
            + Vec4::from(out_tangent0) * (dt * s1)
            + Vec4::from(v1) * s2
            + Vec4::from(in_tangent1) * (dt * s3);
        Quat::from_vec4(blended).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_with_zero_tangents_hits_endpoints() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-1.0, 0.0, 5.0);
        let start = Vec3::interpolate_cubic(a, Vec3::ZERO, Vec3::ZERO, b, 0.0, 1.0);
        let end = Vec3::interpolate_cubic(a, Vec3::ZERO, Vec3::ZERO, b, 1.0, 1.0);
        assert!(start.abs_diff_eq(a, 1e-6));
        assert!(end.abs_diff_eq(b, 1e-6));
    }

    #[test]
    fn quat_linear_is_slerp() {
        let a = Quat::IDENTITY;
        let b = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let mid = Quat::interpolate_linear(a, b, 0.5);
        assert!(mid.abs_diff_eq(Quat::from_rotation_y(std::f32::consts::FRAC_PI_4), 1e-5));
    }
}
