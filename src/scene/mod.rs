//! Retained-mode scene graph.

pub mod camera;
pub mod light;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use camera::Camera;
pub use light::{ShadowConfig, SpotLight, hex_to_rgb};
pub use mesh::Mesh;
pub use node::Node;
pub use scene::{Environment, NodeBuilder, Scene};
pub use skeleton::{Skeleton, SkinBinding};
pub use transform::Transform;

slotmap::new_key_type! {
    pub struct NodeHandle;
    pub struct SkeletonKey;
}
