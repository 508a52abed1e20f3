//! Engine Core Module
//!
//! [`Engine`] ties together the renderer, the scene, the asset store and
//! input state. It holds no window logic of its own; the winit shell in
//! [`crate::app`] drives it.
//!
//! ```rust,ignore
//! let mut engine = Engine::new(RenderSettings::default());
//! engine.init(window, 1280, 720).await?;
//!
//! loop {
//!     engine.update(dt);
//!     engine.render();
//! }
//! ```

use std::sync::Arc;

use winit::window::Window;

use crate::app::input::Input;
use crate::assets::AssetServer;
use crate::renderer::Renderer;
use crate::renderer::settings::RenderSettings;
use crate::scene::Scene;

/// The engine instance.
///
/// # Lifecycle
///
/// 1. Create with [`Engine::new`] or [`Engine::default`]
/// 2. Initialize the GPU with [`Engine::init`]
/// 3. Each frame: [`Engine::update`] then [`Engine::render`]
///
/// Scene and asset state are usable before step 2, which is how tests and
/// headless tools drive it.
pub struct Engine {
    pub renderer: Renderer,
    pub scene: Scene,
    pub assets: AssetServer,
    pub input: Input,

    time: f32,
    frame_count: u64,
}

impl Engine {
    /// Creates an engine. GPU resources are allocated by [`init`](Self::init).
    #[must_use]
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            renderer: Renderer::new(settings),
            scene: Scene::new(),
            assets: AssetServer::new(),
            input: Input::new(),
            time: 0.0,
            frame_count: 0,
        }
    }

    /// Initializes GPU resources for `window`.
    ///
    /// # Errors
    ///
    /// Returns an error if no compatible adapter is found, the device
    /// request fails, or the surface cannot be configured.
    pub async fn init(&mut self, window: Arc<Window>, width: u32, height: u32) -> crate::errors::Result<()> {
        self.renderer.init(window, width, height).await
    }

    /// Total elapsed time in seconds.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Current surface size as `(width, height)`.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.renderer.size()
    }

    /// Resizes the drawing surface and updates the active camera's aspect
    /// ratio. A zero height leaves the aspect untouched.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f32) {
        self.renderer.resize(width, height, scale_factor);
        self.input.handle_resize(width, height);

        if width > 0
            && height > 0
            && let Some((_, camera)) = self.scene.active_camera_bundle_mut()
        {
            camera.set_aspect(width as f32 / height as f32);
        }
    }

    /// Advances time, propagates scene transforms and resets per-frame input.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        self.frame_count += 1;

        self.scene.update();

        self.input.end_frame();
    }

    /// Renders the scene from its active camera.
    pub fn render(&mut self) {
        self.renderer.render(&self.scene, &self.assets);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

/// Per-frame timing passed to [`crate::app::AppHandler::update`].
#[derive(Debug, Clone, Copy)]
pub struct FrameState {
    /// Seconds since the application started.
    pub time: f32,
    /// Seconds since the previous frame.
    pub dt: f32,
    pub frame_count: u64,
}
