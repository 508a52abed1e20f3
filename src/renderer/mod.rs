//! Rendering
//!
//! A small forward renderer built for the stage: up to
//! [`settings::MAX_SPOT_LIGHTS`] shadowed spotlights, Phong and
//! metal/rough materials, and CPU-skinned meshes.
//!
//! [`Renderer`] can exist before it has a GPU: sizes are recorded and the
//! wgpu context is created later by [`Renderer::init`]. Rendering is a
//! no-op until then.

pub mod context;
pub mod dynamic_buffer;
pub mod extract;
pub mod forward;
pub mod gpu_geometry;
pub mod gpu_texture;
pub mod settings;
pub mod shadow;
pub mod skinning;
pub mod uniforms;

use std::sync::Arc;

use winit::window::Window;

use crate::assets::AssetServer;
use crate::errors::Result;
use crate::scene::Scene;

use self::context::WgpuContext;
use self::extract::{extract_draws, extract_lights};
use self::forward::ForwardPass;
use self::settings::RenderSettings;
use self::uniforms::FrameUniforms;

pub struct Renderer {
    settings: RenderSettings,
    context: Option<WgpuContext>,
    forward: Option<ForwardPass>,
    size: (u32, u32),
    pixel_ratio: f32,
    drawing_size: (u32, u32),
}

impl Renderer {
    #[must_use]
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            context: None,
            forward: None,
            size: (0, 0),
            pixel_ratio: 1.0,
            drawing_size: (0, 0),
        }
    }

    /// Creates the GPU context for `window` at the given physical size.
    pub async fn init(&mut self, window: Arc<Window>, width: u32, height: u32) -> Result<()> {
        let context = WgpuContext::new(window, &self.settings, width, height).await?;
        let forward = ForwardPass::new(&context, self.settings.shadow_map_size);
        log::info!(
            "Renderer ready: {:?}, {}x MSAA, {}px shadow maps",
            context.color_format(),
            context.sample_count,
            forward.shadow_map_size()
        );
        self.size = (width, height);
        self.drawing_size = (width, height);
        self.context = Some(context);
        self.forward = Some(forward);
        Ok(())
    }

    /// Records the window's physical size and reconfigures the surface when
    /// a context exists. The surface itself is sized with the clamped pixel
    /// ratio, so a 3x display renders at most at 2x by default.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f32) {
        self.size = (width, height);
        self.pixel_ratio = self.settings.pixel_ratio(scale_factor);
        self.drawing_size = self.settings.drawing_buffer_size(width, height, scale_factor);
        if let Some(context) = &mut self.context {
            let (w, h) = self.drawing_size;
            context.resize(w, h);
        }
    }

    /// Output size as last requested through [`Renderer::resize`].
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Size of the surface actually rendered to.
    #[must_use]
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        self.drawing_size
    }

    #[must_use]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Draws one frame from the active camera. Does nothing without a GPU
    /// context, an active camera, or a zero-sized surface.
    pub fn render(&mut self, scene: &Scene, assets: &AssetServer) {
        let (Some(context), Some(forward)) = (&mut self.context, &mut self.forward) else {
            return;
        };
        let Some(camera) = scene.active_camera().and_then(|h| scene.camera(h)) else {
            return;
        };
        if self.size.0 == 0 || self.size.1 == 0 {
            return;
        }

        let camera_position = camera.position();
        let draws = extract_draws(scene, assets, camera_position);
        let lights = extract_lights(scene);

        forward.prepare(context, scene, assets, &draws);

        let frame = FrameUniforms::new(
            camera.view_projection_matrix(),
            camera_position,
            scene.environment.ambient,
            &lights,
            forward.shadow_map_size(),
            !context.color_format().is_srgb(),
        );
        forward.prepare_frame(context, &frame, &lights);

        let output = match context.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                context.reconfigure();
                return;
            }
            e => {
                log::error!("Render error: {e:?}");
                return;
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        forward.run(context, &mut encoder, &view, self.settings.clear_color, &draws);

        context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        forward.prune(assets);
    }
}
