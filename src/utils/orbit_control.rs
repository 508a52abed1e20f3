use glam::{Vec2, Vec3};
use winit::event::MouseButton;

use crate::app::input::Input;
use crate::scene::transform::Transform;

/// Orbits a camera around `center`: left drag rotates, right drag pans,
/// wheel zooms.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,

    pub center: Vec3,
    pub radius: f32,
    /// Azimuth around +Y, measured from +Z.
    pub theta: f32,
    /// Polar angle from +Y.
    pub phi: f32,

    rotate_delta: Vec2,
}

const PHI_EPS: f32 = 0.0001;

impl OrbitControls {
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: true,
            min_distance: 0.1,
            max_distance: 1000.0,

            center,
            radius,
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,

            rotate_delta: Vec2::ZERO,
        }
    }

    /// Controls that reproduce a camera placed at `position` looking at `center`.
    #[must_use]
    pub fn from_position(position: Vec3, center: Vec3) -> Self {
        let offset = position - center;
        let radius = offset.length().max(PHI_EPS);
        let mut controls = Self::new(center, radius);
        controls.theta = offset.x.atan2(offset.z);
        controls.phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        controls
    }

    /// Camera offset from `center` for the current angles and radius.
    #[must_use]
    pub fn offset(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(
            sin_phi * sin_theta,
            cos_phi,
            sin_phi * cos_theta,
        ) * self.radius
    }

    pub fn update(&mut self, transform: &mut Transform, input: &Input, fov_radians: f32, dt: f32) {
        let screen_height = input.screen_size.y.max(1.0);

        if input.is_button_pressed(MouseButton::Left) {
            let rotate_per_pixel = std::f32::consts::TAU / screen_height;
            self.rotate_delta -= input.cursor_delta * rotate_per_pixel * self.rotate_speed;
        }

        if self.enable_damping {
            // frame-rate independent decay, tuned at 60 fps
            let retention = (1.0 - self.damping_factor).powf(dt * 60.0);
            let applied = self.rotate_delta * (1.0 - retention);
            self.theta += applied.x;
            self.phi += applied.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }

        self.phi = self.phi.clamp(PHI_EPS, std::f32::consts::PI - PHI_EPS);

        if input.scroll_delta.y != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(input.scroll_delta.y.abs());
            if input.scroll_delta.y > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
            self.radius = self.radius.clamp(self.min_distance, self.max_distance);
        }

        if input.is_button_pressed(MouseButton::Right) {
            let world_height = 2.0 * self.radius * (fov_radians / 2.0).tan();
            let pixels_to_world = world_height / screen_height;

            let forward = -self.offset().normalize_or_zero();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward).normalize_or_zero();

            self.center += (right * -input.cursor_delta.x + up * input.cursor_delta.y)
                * pixels_to_world
                * self.pan_speed;
        }

        transform.position = self.center + self.offset();
        transform.look_at(self.center, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_position_round_trips_the_camera_offset() {
        let position = Vec3::new(0.5, 2.0, 2.0);
        let target = Vec3::new(0.0, 1.0, 0.0);
        let controls = OrbitControls::from_position(position, target);
        assert!((controls.center + controls.offset()).abs_diff_eq(position, 1e-5));
    }

    #[test]
    fn idle_update_keeps_camera_in_place() {
        let position = Vec3::new(0.5, 2.0, 2.0);
        let mut controls = OrbitControls::from_position(position, Vec3::Y);
        let mut transform = Transform::new();
        controls.update(&mut transform, &Input::new(), 75f32.to_radians(), 1.0 / 60.0);
        assert!(transform.position.abs_diff_eq(position, 1e-5));
    }
}
