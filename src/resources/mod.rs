//! CPU-side geometry, material and texture data.

pub mod geometry;
pub mod material;
pub mod primitives;
pub mod texture;

pub use geometry::{BoundingBox, Geometry};
pub use material::{AlphaMode, Material, ShadingModel, Side};
pub use texture::{Texture, TextureSampler};

slotmap::new_key_type! {
    pub struct GeometryHandle;
    pub struct MaterialHandle;
    pub struct TextureHandle;
}
