use glam::{Affine3A, Mat4};
use slotmap::SlotMap;

use crate::scene::{Node, NodeHandle, SkeletonKey};

/// Attaches a skinned mesh node to a skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkinBinding {
    pub skeleton: SkeletonKey,
}

#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,
    /// `bones[i]` is joint `i` in vertex joint indices.
    pub bones: Vec<NodeHandle>,
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,
    pub(crate) joint_matrices: Vec<Mat4>,
}

impl Skeleton {
    /// Missing inverse bind matrices default to identity.
    #[must_use]
    pub fn new(name: &str, bones: Vec<NodeHandle>, mut inverse_bind_matrices: Vec<Affine3A>) -> Self {
        inverse_bind_matrices.resize(bones.len(), Affine3A::IDENTITY);
        let joint_count = bones.len();
        Self {
            name: name.to_string(),
            bones,
            inverse_bind_matrices,
            joint_matrices: vec![Mat4::IDENTITY; joint_count],
        }
    }

    /// `joint[i] = world(bone[i]) * inverse_bind[i]`, i.e. the skinned result
    /// is in world space.
    pub fn compute_joint_matrices(&mut self, nodes: &SlotMap<NodeHandle, Node>) {
        for (i, &bone) in self.bones.iter().enumerate() {
            let world = nodes
                .get(bone)
                .map_or(Affine3A::IDENTITY, |n| *n.world_matrix());
            self.joint_matrices[i] = Mat4::from(world * self.inverse_bind_matrices[i]);
        }
    }

    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }
}
