//! Asset IO, background loading and CPU-side asset storage.

pub mod io;
pub mod loaders;
pub mod server;

pub use io::{AssetReaderVariant, FileAssetReader};
#[cfg(feature = "http")]
pub use io::HttpAssetReader;
pub use loaders::{GltfAsset, GltfLoader, ModelInstance};
pub use server::{AssetServer, LoadStatus, LoadTask};
