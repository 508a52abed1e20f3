use std::sync::Arc;

use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::binder::Binder;
use crate::animation::binding::TargetPath;
use crate::animation::clip::AnimationClip;
use crate::animation::group::AnimationObjectGroup;
use crate::scene::{NodeHandle, Scene};

/// Index of an action inside its mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionHandle(usize);

/// Drives every action over every model in its object group.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    group: AnimationObjectGroup,
    actions: Vec<AnimationAction>,
    time: f32,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn group(&self) -> &AnimationObjectGroup {
        &self.group
    }

    /// Total time the mixer has been advanced, scaled by nothing.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Registers a model root and rebinds existing actions to include it.
    pub fn add_object(&mut self, scene: &Scene, root: NodeHandle) {
        if self.group.add(root) {
            self.rebind(scene);
        }
    }

    pub fn remove_object(&mut self, scene: &Scene, root: NodeHandle) {
        if self.group.remove(root) {
            self.rebind(scene);
        }
    }

    /// Creates an inactive action for `clip` bound to every group member.
    pub fn clip_action(&mut self, scene: &Scene, clip: Arc<AnimationClip>) -> ActionHandle {
        let mut action = AnimationAction::new(clip);
        action.bindings = self.bind_all(scene, action.clip());
        self.actions.push(action);
        ActionHandle(self.actions.len() - 1)
    }

    /// Swaps the action behind `handle` for a fresh, stopped action playing
    /// `clip`. Returns `None` when `handle` does not belong to this mixer.
    pub fn replace_action(&mut self, scene: &Scene, handle: ActionHandle, clip: Arc<AnimationClip>) -> Option<ActionHandle> {
        if handle.0 >= self.actions.len() {
            return None;
        }
        let mut action = AnimationAction::new(clip);
        action.bindings = self.bind_all(scene, action.clip());
        self.actions[handle.0] = action;
        Some(handle)
    }

    #[must_use]
    pub fn action(&self, handle: ActionHandle) -> Option<&AnimationAction> {
        self.actions.get(handle.0)
    }

    pub fn action_mut(&mut self, handle: ActionHandle) -> Option<&mut AnimationAction> {
        self.actions.get_mut(handle.0)
    }

    #[must_use]
    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    fn bind_all(&self, scene: &Scene, clip: &AnimationClip) -> Vec<crate::animation::PropertyBinding> {
        self.group
            .roots()
            .iter()
            .flat_map(|&root| Binder::bind(scene, root, clip))
            .collect()
    }

    fn rebind(&mut self, scene: &Scene) {
        let bindings: Vec<_> = self
            .actions
            .iter()
            .map(|action| self.bind_all(scene, action.clip()))
            .collect();
        for (action, bindings) in self.actions.iter_mut().zip(bindings) {
            action.bindings = bindings;
        }
    }

    /// Advances all actions by `dt` seconds and writes sampled values into
    /// the bound node transforms.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        self.time += dt;

        for action in &mut self.actions {
            action.update(dt);

            if !action.enabled || action.weight <= 0.0 {
                continue;
            }

            let weight = action.weight.min(1.0);
            for binding_index in 0..action.bindings.len() {
                let binding = action.bindings[binding_index].clone();
                let Some(value) = action.sample_track(binding.track_index) else {
                    continue;
                };
                let Some(node) = scene.get_node_mut(binding.node_handle) else {
                    continue;
                };

                let transform = &mut node.transform;
                match (binding.target, value) {
                    (TargetPath::Translation, TrackValue::Vector3(v)) => {
                        transform.position = transform.position.lerp(v, weight);
                    }
                    (TargetPath::Scale, TrackValue::Vector3(v)) => {
                        transform.scale = transform.scale.lerp(v, weight);
                    }
                    (TargetPath::Rotation, TrackValue::Quaternion(q)) => {
                        transform.rotation = transform.rotation.slerp(q, weight);
                    }
                    _ => continue,
                }
                transform.mark_dirty();
            }
        }
    }
}
