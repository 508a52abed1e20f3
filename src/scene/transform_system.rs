//! World matrix propagation, kept apart from `Scene` so it only borrows the
//! node arena.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// Updates world matrices below `roots`, depth first.
///
/// A node's world matrix is recomputed when its own TRS changed or any
/// ancestor's world matrix did.
pub fn update_hierarchy(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = roots
        .iter()
        .rev()
        .map(|&root| (root, Affine3A::IDENTITY, false))
        .collect();

    while let Some((handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let changed = local_changed || parent_changed;
        if changed {
            let world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(world);
        }

        let world = *node.transform.world_matrix();
        for &child in node.children.iter().rev() {
            stack.push((child, world, changed));
        }
    }
}
