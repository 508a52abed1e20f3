use std::future::Future;

use slotmap::SlotMap;

use crate::assets::loaders::GltfAsset;
use crate::assets::loaders::gltf::GltfLoader;
use crate::errors::{Result, StageError};
use crate::resources::{
    Geometry, GeometryHandle, Material, MaterialHandle, Texture, TextureHandle,
};

#[cfg(not(target_arch = "wasm32"))]
use std::sync::OnceLock;
#[cfg(not(target_arch = "wasm32"))]
use tokio::runtime::Runtime;

#[cfg(not(target_arch = "wasm32"))]
fn asset_runtime() -> Option<&'static Runtime> {
    static RUNTIME: OnceLock<Option<Runtime>> = OnceLock::new();
    RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .thread_name("asset-loader")
                .enable_all()
                .build()
                .map_err(|err| log::error!("Failed to create asset loader runtime: {err}"))
                .ok()
        })
        .as_ref()
}

/// Outcome of polling a [`LoadTask`].
#[derive(Debug)]
pub enum LoadStatus<T> {
    Pending,
    Ready(T),
    Failed(StageError),
}

/// Handle to a background load. The result is delivered exactly once,
/// either by [`LoadTask::poll`] or [`LoadTask::wait`].
#[derive(Debug)]
pub struct LoadTask<T> {
    label: String,
    receiver: flume::Receiver<Result<T>>,
    finished: bool,
}

impl<T> LoadTask<T> {
    /// A task that has already completed with `result`.
    #[must_use]
    pub fn from_result(label: &str, result: Result<T>) -> Self {
        let (tx, rx) = flume::bounded(1);
        let _ = tx.send(result);
        Self {
            label: label.to_string(),
            receiver: rx,
            finished: false,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Non-blocking check. After a `Ready` or `Failed` has been returned,
    /// further polls report the task as cancelled.
    pub fn poll(&mut self) -> LoadStatus<T> {
        if self.finished {
            return LoadStatus::Failed(StageError::LoadCancelled(format!(
                "{}: result already taken",
                self.label
            )));
        }
        match self.receiver.try_recv() {
            Ok(result) => {
                self.finished = true;
                match result {
                    Ok(value) => LoadStatus::Ready(value),
                    Err(err) => LoadStatus::Failed(err),
                }
            }
            Err(flume::TryRecvError::Empty) => LoadStatus::Pending,
            Err(flume::TryRecvError::Disconnected) => {
                self.finished = true;
                LoadStatus::Failed(StageError::LoadCancelled(self.label.clone()))
            }
        }
    }

    /// Waits for the result.
    pub async fn wait(self) -> Result<T> {
        let label = self.label;
        self.receiver
            .recv_async()
            .await
            .map_err(|_| StageError::LoadCancelled(label))?
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn spawn_load<T, F>(label: &str, future: F) -> LoadTask<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    let (tx, rx) = flume::bounded(1);
    match asset_runtime() {
        Some(runtime) => {
            runtime.spawn(async move {
                let _ = tx.send(future.await);
            });
        }
        None => {
            let _ = tx.send(Err(StageError::RuntimeUnavailable(label.to_string())));
        }
    }
    LoadTask {
        label: label.to_string(),
        receiver: rx,
        finished: false,
    }
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn spawn_load<T, F>(label: &str, future: F) -> LoadTask<T>
where
    T: 'static,
    F: Future<Output = Result<T>> + 'static,
{
    let (tx, rx) = flume::bounded(1);
    wasm_bindgen_futures::spawn_local(async move {
        let _ = tx.send(future.await);
    });
    LoadTask {
        label: label.to_string(),
        receiver: rx,
        finished: false,
    }
}

/// Owns CPU-side geometry, material and texture data; meshes refer to them
/// by handle.
#[derive(Debug, Default)]
pub struct AssetServer {
    geometries: SlotMap<GeometryHandle, Geometry>,
    materials: SlotMap<MaterialHandle, Material>,
    textures: SlotMap<TextureHandle, Texture>,
}

impl AssetServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts loading a glTF/GLB file in the background.
    #[must_use]
    pub fn load_gltf(&self, source: &str) -> LoadTask<GltfAsset> {
        let owned = source.to_string();
        spawn_load(source, async move { GltfLoader::load(&owned).await })
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryHandle {
        self.geometries.insert(geometry)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.insert(material)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureHandle {
        self.textures.insert(texture)
    }

    /// Drops a geometry. GPU copies are released on the renderer's next prune.
    pub fn remove_geometry(&mut self, handle: GeometryHandle) -> Option<Geometry> {
        self.geometries.remove(handle)
    }

    pub fn remove_material(&mut self, handle: MaterialHandle) -> Option<Material> {
        self.materials.remove(handle)
    }

    pub fn remove_texture(&mut self, handle: TextureHandle) -> Option<Texture> {
        self.textures.remove(handle)
    }

    #[must_use]
    pub fn geometry(&self, handle: GeometryHandle) -> Option<&Geometry> {
        self.geometries.get(handle)
    }

    #[must_use]
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    pub fn material_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.materials.get_mut(handle)
    }

    #[must_use]
    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle)
    }

    pub fn texture_mut(&mut self, handle: TextureHandle) -> Option<&mut Texture> {
        self.textures.get_mut(handle)
    }

    #[must_use]
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    #[must_use]
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}
