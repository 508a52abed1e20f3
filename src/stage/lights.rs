//! Randomized spotlight motion.
//!
//! Every interval each animated light gets two fresh tweens: one for its
//! cone (angle and penumbra together) and one for its position. Tweens
//! start from whatever the light currently shows and are never cancelled;
//! when several tweens drive the same property the most recently started
//! one is applied last and wins the frame.

use glam::Vec3;
use rand::rngs::StdRng;

use crate::scene::{NodeHandle, Scene};
use crate::stage::config::LightAnimationConfig;
use crate::tween::Tween;

#[derive(Debug, Clone)]
enum LightTween {
    Cone {
        light: NodeHandle,
        angle: Tween<f32>,
        penumbra: Tween<f32>,
    },
    Position {
        light: NodeHandle,
        position: Tween<Vec3>,
    },
}

impl LightTween {
    fn is_finished(&self) -> bool {
        match self {
            Self::Cone { angle, penumbra, .. } => angle.is_finished() && penumbra.is_finished(),
            Self::Position { position, .. } => position.is_finished(),
        }
    }

    /// Advances and writes the new values. Returns `false` if the light is gone.
    fn apply(&mut self, dt: f32, scene: &mut Scene) -> bool {
        match self {
            Self::Cone {
                light,
                angle,
                penumbra,
            } => {
                let Some((spot, _)) = scene.light_bundle_mut(*light) else {
                    return false;
                };
                spot.angle = angle.advance(dt);
                spot.penumbra = penumbra.advance(dt);
            }
            Self::Position { light, position } => {
                let Some((_, transform)) = scene.light_bundle_mut(*light) else {
                    return false;
                };
                transform.position = position.advance(dt);
                transform.mark_dirty();
            }
        }
        true
    }
}

pub struct LightAnimator {
    lights: Vec<NodeHandle>,
    config: LightAnimationConfig,
    rng: StdRng,
    /// Milliseconds since the last trigger.
    since_trigger: f32,
    started: bool,
    tweens: Vec<LightTween>,
}

impl LightAnimator {
    #[must_use]
    pub fn new(lights: Vec<NodeHandle>, config: LightAnimationConfig, rng: StdRng) -> Self {
        Self {
            lights,
            config,
            rng,
            since_trigger: 0.0,
            started: false,
            tweens: Vec::new(),
        }
    }

    #[must_use]
    pub fn lights(&self) -> &[NodeHandle] {
        &self.lights
    }

    /// Number of tweens still running.
    #[must_use]
    pub fn active_tweens(&self) -> usize {
        self.tweens.len()
    }

    /// Triggers on the first call and then every configured interval,
    /// before advancing all tweens by `dt` seconds.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        if self.started {
            self.since_trigger += dt.max(0.0) * 1000.0;
            if self.config.interval_ms <= 0.0 {
                self.since_trigger = 0.0;
                self.retrigger(scene);
            }
            while self.config.interval_ms > 0.0 && self.since_trigger >= self.config.interval_ms {
                self.since_trigger -= self.config.interval_ms;
                self.retrigger(scene);
            }
        } else {
            self.started = true;
            self.retrigger(scene);
        }

        self.advance(dt, scene);
    }

    /// Advances every tween by `dt` seconds and drops finished ones.
    pub fn advance(&mut self, dt: f32, scene: &mut Scene) {
        self.tweens.retain_mut(|tween| tween.apply(dt, scene) && !tween.is_finished());
    }

    /// Starts a cone tween and a position tween for each light, from its
    /// current values toward fresh random targets.
    pub fn retrigger(&mut self, scene: &mut Scene) {
        let cfg = &self.config;
        for &light in &self.lights {
            let Some((spot, transform)) = scene.light_bundle_mut(light) else {
                continue;
            };

            let cone_duration = cfg.duration_ms.sample(&mut self.rng) / 1000.0;
            let target_angle = cfg.angle.sample(&mut self.rng);
            let target_penumbra = cfg.penumbra.sample(&mut self.rng);
            self.tweens.push(LightTween::Cone {
                light,
                angle: Tween::new(spot.angle, target_angle, cone_duration, cfg.easing),
                penumbra: Tween::new(spot.penumbra, target_penumbra, cone_duration, cfg.easing),
            });

            let target = Vec3::new(
                cfg.x.sample(&mut self.rng),
                cfg.y.sample(&mut self.rng),
                cfg.z.sample(&mut self.rng),
            );
            let move_duration = cfg.duration_ms.sample(&mut self.rng) / 1000.0;
            self.tweens.push(LightTween::Position {
                light,
                position: Tween::new(transform.position, target, move_duration, cfg.easing),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SpotLight;
    use rand::SeedableRng;

    fn stage_with_light() -> (Scene, NodeHandle) {
        let mut scene = Scene::new();
        let light = scene
            .build_node("Spot")
            .with_position(Vec3::new(0.0, 5.0, 3.5))
            .with_light(SpotLight::from_hex(0x00ff7f, 10.0))
            .build();
        (scene, light)
    }

    #[test]
    fn first_update_triggers_immediately() {
        let (mut scene, light) = stage_with_light();
        let mut animator = LightAnimator::new(
            vec![light],
            LightAnimationConfig::default(),
            StdRng::seed_from_u64(3),
        );
        animator.update(0.016, &mut scene);
        assert_eq!(animator.active_tweens(), 2);

        // still inside the first interval
        animator.update(0.1, &mut scene);
        assert_eq!(animator.active_tweens(), 2);

        animator.update(0.4, &mut scene);
        assert_eq!(animator.active_tweens(), 4);
    }

    #[test]
    fn tweens_finish_and_are_dropped() {
        let (mut scene, light) = stage_with_light();
        let mut animator = LightAnimator::new(
            vec![light],
            LightAnimationConfig::default(),
            StdRng::seed_from_u64(11),
        );
        animator.retrigger(&mut scene);
        animator.advance(5.0, &mut scene);
        assert_eq!(animator.active_tweens(), 0);
    }

    #[test]
    fn missing_light_is_skipped() {
        let (mut scene, light) = stage_with_light();
        scene.remove_node(light);
        let mut animator = LightAnimator::new(
            vec![light],
            LightAnimationConfig::default(),
            StdRng::seed_from_u64(5),
        );
        animator.update(0.016, &mut scene);
        assert_eq!(animator.active_tweens(), 0);
    }
}
