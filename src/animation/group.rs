use crate::scene::NodeHandle;

/// Set of model roots driven together by one mixer.
///
/// Every avatar attached to the stage is registered here, so a single
/// [`AnimationMixer`](crate::animation::AnimationMixer) animates all of them.
#[derive(Debug, Default, Clone)]
pub struct AnimationObjectGroup {
    roots: Vec<NodeHandle>,
}

impl AnimationObjectGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if `root` was already a member.
    pub fn add(&mut self, root: NodeHandle) -> bool {
        if self.contains(root) {
            return false;
        }
        self.roots.push(root);
        true
    }

    pub fn remove(&mut self, root: NodeHandle) -> bool {
        let before = self.roots.len();
        self.roots.retain(|&r| r != root);
        self.roots.len() != before
    }

    #[must_use]
    pub fn contains(&self, root: NodeHandle) -> bool {
        self.roots.contains(&root)
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
