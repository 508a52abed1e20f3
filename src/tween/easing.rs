use serde::{Deserialize, Serialize};

/// Easing curves mapping normalized progress `k` in `[0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    QuadraticIn,
    #[default]
    QuadraticOut,
    QuadraticInOut,
    CubicOut,
}

impl Easing {
    #[must_use]
    pub fn apply(self, k: f32) -> f32 {
        let k = k.clamp(0.0, 1.0);
        match self {
            Self::Linear => k,
            Self::QuadraticIn => k * k,
            Self::QuadraticOut => k * (2.0 - k),
            Self::QuadraticInOut => {
                let k2 = k * 2.0;
                if k2 < 1.0 {
                    0.5 * k2 * k2
                } else {
                    let k2 = k2 - 1.0;
                    -0.5 * (k2 * (k2 - 2.0) - 1.0)
                }
            }
            Self::CubicOut => {
                let k = k - 1.0;
                k * k * k + 1.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_curve_starts_at_zero_and_ends_at_one() {
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

    #[test]
    fn quadratic_out_decelerates() {
        assert!((Easing::QuadraticOut.apply(0.5) - 0.75).abs() < 1e-6);
        assert!(Easing::QuadraticOut.apply(0.25) > 0.25);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(Easing::QuadraticOut.apply(2.0), 1.0);
        assert_eq!(Easing::QuadraticOut.apply(-1.0), 0.0);
    }
}
