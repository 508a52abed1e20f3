pub mod gltf;

pub use self::gltf::{GltfAsset, GltfLoader, ModelInstance, decode_data_uri, sanitize_node_name};
