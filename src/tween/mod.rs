//! Time-bounded interpolation of a property from a start value to a target.

mod easing;

pub use easing::Easing;

use crate::animation::Interpolatable;

/// Interpolates from `from` to `to` over `duration` seconds.
///
/// A tween never overshoots: once `elapsed >= duration` it reports
/// [`Tween::is_finished`] and [`Tween::value`] returns exactly `to`.
#[derive(Debug, Clone, Copy)]
pub struct Tween<V: Interpolatable> {
    from: V,
    to: V,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl<V: Interpolatable> Tween<V> {
    #[must_use]
    pub fn new(from: V, to: V, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    /// Advances by `dt` seconds and returns the new value.
    pub fn advance(&mut self, dt: f32) -> V {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }

    #[must_use]
    pub fn value(&self) -> V {
        if self.is_finished() {
            return self.to;
        }
        let eased = self.easing.apply(self.progress());
        V::interpolate_linear(self.from, self.to, eased)
    }

    /// Normalized progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    #[must_use]
    pub fn target(&self) -> V {
        self.to
    }

    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }
}
