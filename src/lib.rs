//! # Avatar Stage
//!
//! A small wgpu viewer that puts one skinned glTF avatar on a round floor,
//! plays a filtered dance clip on it, and sweeps three colored spotlights
//! around it while a white key light stays fixed.
//!
//! The crate is layered bottom-up:
//!
//! - [`scene`], [`resources`]: node arena, components and CPU-side assets
//! - [`animation`], [`tween`]: keyframe playback and property tweens
//! - [`assets`]: asynchronous glTF loading
//! - [`renderer`]: forward spotlight shading with shadow maps
//! - [`engine`], [`app`]: per-frame orchestration and the winit shell
//! - [`stage`]: the avatar stage itself
//!
//! ```rust,ignore
//! use avatar_stage::{App, AvatarStage, StageConfig};
//!
//! let config = StageConfig::default();
//! App::new()
//!     .with_settings(config.render.to_render_settings())
//!     .run(move |engine, _window| {
//!         let mut stage = AvatarStage::new(engine, config);
//!         stage.start_loading(&engine.assets);
//!         stage
//!     })?;
//! ```

pub mod animation;
pub mod app;
pub mod assets;
pub mod engine;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod stage;
pub mod tween;
pub mod utils;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, LoopMode, filter_clip};
pub use app::{App, AppHandler};
pub use assets::{AssetServer, GltfAsset, GltfLoader, LoadStatus, LoadTask};
pub use engine::{Engine, FrameState};
pub use errors::{Result, StageError};
pub use renderer::Renderer;
pub use renderer::settings::RenderSettings;
pub use resources::{Geometry, Material, Texture};
pub use scene::{Camera, Node, NodeHandle, Scene, SpotLight};
pub use stage::{AssetState, AvatarStage, StageConfig};
pub use tween::{Easing, Tween};
pub use utils::{Clock, OrbitControls};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser entry point: runs the default stage in a canvas appended to the
/// page body.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = StageConfig::default();
    App::new()
        .with_title(config.title.clone())
        .with_settings(config.render.to_render_settings())
        .run(move |engine, _window| {
            let mut stage = AvatarStage::new(engine, config);
            stage.start_loading(&engine.assets);
            stage
        })
        .map_err(|err| JsValue::from_str(&err.to_string()))
}
