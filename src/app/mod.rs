//! Winit application shell.
//!
//! [`App`] configures the window and renderer, then hands control to the
//! event loop. Application behavior lives in an [`AppHandler`], created by
//! a factory closure once the GPU context is ready.
//!
//! ```rust,ignore
//! App::new()
//!     .with_title("Avatar Stage")
//!     .run(|engine, _window| MyHandler::new(engine))?;
//! ```

pub mod input;

use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
pub use winit::window::{Window, WindowId};

use crate::engine::{Engine, FrameState};
use crate::errors::Result;
use crate::renderer::settings::RenderSettings;

/// Per-application behavior driven by the event loop.
///
/// The runner calls [`on_event`](Self::on_event) for every window event,
/// then once per frame [`update`](Self::update) followed by the engine's
/// own update and render.
pub trait AppHandler: 'static {
    /// Return `true` to stop the runner from handling the event itself.
    #[allow(unused_variables)]
    fn on_event(&mut self, engine: &mut Engine, window: &Arc<Window>, event: &WindowEvent) -> bool {
        false
    }

    fn update(&mut self, engine: &mut Engine, window: &Arc<Window>, frame: &FrameState);
}

/// Application builder.
pub struct App {
    title: String,
    render_settings: RenderSettings,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Avatar Stage".into(),
            render_settings: RenderSettings::default(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.render_settings = settings;
        self
    }

    /// Runs the event loop until the window closes. `init` builds the
    /// handler after the renderer has been initialized.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run<H, F>(self, init: F) -> Result<()>
    where
        H: AppHandler,
        F: FnOnce(&mut Engine, &Arc<Window>) -> H + 'static,
    {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::new(self.title, self.render_settings, init);
        event_loop.run_app(&mut runner)?;
        Ok(())
    }

    /// Browser variant: schedules the event loop and returns immediately.
    #[cfg(target_arch = "wasm32")]
    pub fn run<H, F>(self, init: F) -> Result<()>
    where
        H: AppHandler,
        F: FnOnce(&mut Engine, &Arc<Window>) -> H + 'static,
    {
        use winit::platform::web::EventLoopExtWebSys;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let runner = AppRunner::new(self.title, self.render_settings, init);
        event_loop.spawn_app(runner);
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

struct AppRunner<H, F> {
    title: String,
    render_settings: RenderSettings,
    init: Option<F>,

    window: Option<Arc<Window>>,
    engine: Option<Engine>,
    handler: Option<H>,

    start_time: Instant,
    last_loop_time: Instant,

    #[cfg(target_arch = "wasm32")]
    pending_engine: Option<flume::Receiver<Result<Engine>>>,
}

impl<H, F> AppRunner<H, F>
where
    H: AppHandler,
    F: FnOnce(&mut Engine, &Arc<Window>) -> H + 'static,
{
    fn new(title: String, render_settings: RenderSettings, init: F) -> Self {
        let now = Instant::now();
        Self {
            title,
            render_settings,
            init: Some(init),
            window: None,
            engine: None,
            handler: None,
            start_time: now,
            last_loop_time: now,
            #[cfg(target_arch = "wasm32")]
            pending_engine: None,
        }
    }

    fn start(&mut self, mut engine: Engine, window: &Arc<Window>) {
        if let Some(init) = self.init.take() {
            self.handler = Some(init(&mut engine, window));
        }
        let size = window.inner_size();
        engine.resize(size.width.max(1), size.height.max(1), window.scale_factor() as f32);
        self.engine = Some(engine);

        let now = Instant::now();
        self.start_time = now;
        self.last_loop_time = now;
        log::info!("Render loop started");
    }

    #[cfg(target_arch = "wasm32")]
    fn poll_pending_engine(&mut self, event_loop: &ActiveEventLoop) {
        let Some(receiver) = &self.pending_engine else {
            return;
        };
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(flume::TryRecvError::Empty) => return,
            Err(flume::TryRecvError::Disconnected) => {
                log::error!("Renderer initialization was dropped");
                self.pending_engine = None;
                event_loop.exit();
                return;
            }
        };
        self.pending_engine = None;
        match (result, self.window.clone()) {
            (Ok(engine), Some(window)) => self.start(engine, &window),
            (Err(err), _) => {
                log::error!("Fatal renderer error: {err}");
                event_loop.exit();
            }
            (Ok(_), None) => {}
        }
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let time = now.duration_since(self.start_time).as_secs_f32();
        let dt = now.duration_since(self.last_loop_time).as_secs_f32();
        self.last_loop_time = now;

        let (Some(window), Some(engine), Some(handler)) =
            (&self.window, &mut self.engine, &mut self.handler)
        else {
            return;
        };

        let frame = FrameState {
            time,
            dt,
            frame_count: engine.frame_count(),
        };
        handler.update(engine, window, &frame);
        engine.update(dt);
        engine.render();
        window.request_redraw();
    }
}

impl<H, F> ApplicationHandler for AppRunner<H, F>
where
    H: AppHandler,
    F: FnOnce(&mut Engine, &Arc<Window>) -> H + 'static,
{
    #[cfg(not(target_arch = "wasm32"))]
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        log::info!("Initializing renderer backend...");
        let mut engine = Engine::new(self.render_settings.clone());
        let size = window.inner_size();
        if let Err(err) = pollster::block_on(engine.init(window.clone(), size.width, size.height)) {
            log::error!("Fatal renderer error: {err}");
            event_loop.exit();
            return;
        }
        self.start(engine, &window);
    }

    #[cfg(target_arch = "wasm32")]
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        use winit::platform::web::WindowAttributesExtWebSys;

        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_append(true);
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create canvas window: {err}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        log::info!("Initializing WebGPU backend...");
        let settings = self.render_settings.clone();
        let (tx, rx) = flume::bounded(1);
        self.pending_engine = Some(rx);

        wasm_bindgen_futures::spawn_local(async move {
            let mut engine = Engine::new(settings);
            let size = window.inner_size();
            let result = engine
                .init(window.clone(), size.width.max(1), size.height.max(1))
                .await
                .map(|()| engine);
            let _ = tx.send(result);
            window.request_redraw();
        });
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        #[cfg(target_arch = "wasm32")]
        {
            if self.engine.is_none() {
                self.poll_pending_engine(event_loop);
            }
        }

        let (Some(window), Some(engine), Some(handler)) =
            (&self.window, &mut self.engine, &mut self.handler)
        else {
            if matches!(event, WindowEvent::CloseRequested) {
                event_loop.exit();
            }
            return;
        };

        if !handler.on_event(engine, window, &event) {
            engine.input.handle_window_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                let scale_factor = window.scale_factor() as f32;
                engine.resize(size.width, size.height, scale_factor);
            }
            WindowEvent::RedrawRequested => self.tick(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.engine.is_some()
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }
}
