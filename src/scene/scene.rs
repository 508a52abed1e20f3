use glam::Vec3;
use slotmap::{SecondaryMap, SlotMap, SparseSecondaryMap};

use crate::scene::camera::Camera;
use crate::scene::light::SpotLight;
use crate::scene::mesh::Mesh;
use crate::scene::node::Node;
use crate::scene::skeleton::{Skeleton, SkinBinding};
use crate::scene::transform_system;
use crate::scene::{NodeHandle, SkeletonKey};

/// Ambient lighting shared by every material in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    /// Flat ambient term; materials scale it by their environment intensity.
    pub ambient: Vec3,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.4),
        }
    }
}

/// Node arena plus component maps.
///
/// Nodes without a parent are tracked in `root_nodes`; matrices are
/// propagated from there in [`Scene::update`].
#[derive(Debug, Default)]
pub struct Scene {
    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    root_nodes: Vec<NodeHandle>,

    names: SecondaryMap<NodeHandle, String>,
    meshes: SparseSecondaryMap<NodeHandle, Mesh>,
    lights: SparseSecondaryMap<NodeHandle, SpotLight>,
    cameras: SparseSecondaryMap<NodeHandle, Camera>,
    skins: SparseSecondaryMap<NodeHandle, SkinBinding>,
    skeletons: SlotMap<SkeletonKey, Skeleton>,

    active_camera: Option<NodeHandle>,
    pub environment: Environment,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Creates an empty root node.
    pub fn create_node(&mut self) -> NodeHandle {
        let handle = self.nodes.insert(Node::new());
        self.root_nodes.push(handle);
        handle
    }

    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let handle = self.create_node();
        self.names.insert(handle, name.to_string());
        handle
    }

    /// Starts a fluent node builder.
    pub fn build_node(&mut self, name: &str) -> NodeBuilder<'_> {
        NodeBuilder::new(self, name)
    }

    /// Moves `child` under `parent`, detaching it from its previous parent.
    ///
    /// Ignored if either handle is stale, or if `parent` is inside the
    /// subtree of `child`.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent || !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            return;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Refusing to attach a node under its own descendant");
            return;
        }

        self.detach(child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
            node.transform.mark_dirty();
        }
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(child);
        }
        self.root_nodes.retain(|&r| r != child);
    }

    /// Turns `child` into a root node.
    pub fn detach(&mut self, child: NodeHandle) {
        let Some(old_parent) = self.nodes.get(child).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(old_parent) {
            parent_node.children.retain(|&c| c != child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
            node.transform.mark_dirty();
        }
        self.root_nodes.push(child);
    }

    fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(handle).and_then(|n| n.parent);
        }
        false
    }

    /// Removes `handle` and its whole subtree together with their components.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.detach(handle);
        self.root_nodes.retain(|&r| r != handle);

        for node in self.traverse(handle) {
            self.nodes.remove(node);
            self.names.remove(node);
            self.meshes.remove(node);
            self.lights.remove(node);
            self.cameras.remove(node);
            self.skins.remove(node);
            if self.active_camera == Some(node) {
                self.active_camera = None;
            }
        }

        let nodes = &self.nodes;
        self.skeletons
            .retain(|_, skeleton| skeleton.bones.iter().all(|&b| nodes.contains_key(b)));
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn root_nodes(&self) -> &[NodeHandle] {
        &self.root_nodes
    }

    #[must_use]
    pub fn name(&self, handle: NodeHandle) -> Option<&str> {
        self.names.get(handle).map(String::as_str)
    }

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        if self.nodes.contains_key(handle) {
            self.names.insert(handle, name.to_string());
        }
    }

    /// Pre-order list of `root` and all of its descendants.
    #[must_use]
    pub fn traverse(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            out.push(handle);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// First node named `name` in the subtree at `root`, pre-order.
    #[must_use]
    pub fn find_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.traverse(root)
            .into_iter()
            .find(|&handle| self.name(handle) == Some(name))
    }

    // ========================================================================
    // Components
    // ========================================================================

    pub fn set_mesh(&mut self, handle: NodeHandle, mesh: Mesh) {
        if self.nodes.contains_key(handle) {
            self.meshes.insert(handle, mesh);
        }
    }

    #[must_use]
    pub fn mesh(&self, handle: NodeHandle) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    pub fn mesh_mut(&mut self, handle: NodeHandle) -> Option<&mut Mesh> {
        self.meshes.get_mut(handle)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (NodeHandle, &Mesh)> {
        self.meshes.iter()
    }

    pub fn set_light(&mut self, handle: NodeHandle, light: SpotLight) {
        if self.nodes.contains_key(handle) {
            self.lights.insert(handle, light);
        }
    }

    #[must_use]
    pub fn light(&self, handle: NodeHandle) -> Option<&SpotLight> {
        self.lights.get(handle)
    }

    pub fn light_mut(&mut self, handle: NodeHandle) -> Option<&mut SpotLight> {
        self.lights.get_mut(handle)
    }

    pub fn lights(&self) -> impl Iterator<Item = (NodeHandle, &SpotLight)> {
        self.lights.iter()
    }

    #[must_use]
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Mutable access to a light and the transform of its node.
    pub fn light_bundle_mut(
        &mut self,
        handle: NodeHandle,
    ) -> Option<(&mut SpotLight, &mut crate::scene::Transform)> {
        let light = self.lights.get_mut(handle)?;
        let node = self.nodes.get_mut(handle)?;
        Some((light, &mut node.transform))
    }

    pub fn set_camera(&mut self, handle: NodeHandle, camera: Camera) {
        if self.nodes.contains_key(handle) {
            self.cameras.insert(handle, camera);
            if self.active_camera.is_none() {
                self.active_camera = Some(handle);
            }
        }
    }

    #[must_use]
    pub fn camera(&self, handle: NodeHandle) -> Option<&Camera> {
        self.cameras.get(handle)
    }

    pub fn camera_mut(&mut self, handle: NodeHandle) -> Option<&mut Camera> {
        self.cameras.get_mut(handle)
    }

    #[must_use]
    pub fn active_camera(&self) -> Option<NodeHandle> {
        self.active_camera
    }

    pub fn set_active_camera(&mut self, handle: Option<NodeHandle>) {
        self.active_camera = handle.filter(|&h| self.cameras.contains_key(h));
    }

    /// The active camera together with its node transform.
    pub fn active_camera_bundle_mut(&mut self) -> Option<(&mut crate::scene::Transform, &mut Camera)> {
        let handle = self.active_camera?;
        let camera = self.cameras.get_mut(handle)?;
        let node = self.nodes.get_mut(handle)?;
        Some((&mut node.transform, camera))
    }

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skeletons.insert(skeleton)
    }

    #[must_use]
    pub fn skeleton(&self, key: SkeletonKey) -> Option<&Skeleton> {
        self.skeletons.get(key)
    }

    pub fn bind_skin(&mut self, handle: NodeHandle, skeleton: SkeletonKey) {
        if self.nodes.contains_key(handle) && self.skeletons.contains_key(skeleton) {
            self.skins.insert(handle, SkinBinding { skeleton });
        }
    }

    #[must_use]
    pub fn skin(&self, handle: NodeHandle) -> Option<&SkinBinding> {
        self.skins.get(handle)
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy(&mut self.nodes, &self.root_nodes);
    }

    /// Propagates transforms, then refreshes skeleton joints and camera matrices.
    pub fn update(&mut self) {
        self.update_matrix_world();

        let nodes = &self.nodes;
        for skeleton in self.skeletons.values_mut() {
            skeleton.compute_joint_matrices(nodes);
        }

        for (handle, camera) in self.cameras.iter_mut() {
            if let Some(node) = nodes.get(handle) {
                camera.update_view_projection(node.world_matrix());
            }
        }
    }
}

/// Fluent construction of a named node.
pub struct NodeBuilder<'a> {
    scene: &'a mut Scene,
    name: String,
    node: Node,
    parent: Option<NodeHandle>,
    mesh: Option<Mesh>,
    light: Option<SpotLight>,
    camera: Option<Camera>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(scene: &'a mut Scene, name: &str) -> Self {
        Self {
            scene,
            name: name.to_string(),
            node: Node::new(),
            parent: None,
            mesh: None,
            light: None,
            camera: None,
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.node.transform.position = position;
        self
    }

    #[must_use]
    pub fn with_rotation_euler(mut self, x: f32, y: f32, z: f32) -> Self {
        self.node.transform.set_rotation_euler(x, y, z);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    #[must_use]
    pub fn with_light(mut self, light: SpotLight) -> Self {
        self.light = Some(light);
        self
    }

    #[must_use]
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn build(self) -> NodeHandle {
        let Self {
            scene,
            name,
            node,
            parent,
            mesh,
            light,
            camera,
        } = self;

        let handle = scene.nodes.insert(node);
        scene.root_nodes.push(handle);
        scene.names.insert(handle, name);
        if let Some(parent) = parent {
            scene.attach(handle, parent);
        }
        if let Some(mesh) = mesh {
            scene.set_mesh(handle, mesh);
        }
        if let Some(light) = light {
            scene.set_light(handle, light);
        }
        if let Some(camera) = camera {
            scene.set_camera(handle, camera);
        }
        handle
    }
}
