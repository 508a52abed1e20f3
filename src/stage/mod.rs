//! The avatar stage: a round floor, four spotlights, an orbiting camera and
//! one animated avatar.
//!
//! [`AvatarStage`] is the application handler. It builds the static scene
//! up front, starts the model and animation loads, and each frame polls
//! those loads, moves the colored lights, advances the animation mixer and
//! updates the orbit controls.

pub mod composer;
pub mod config;
pub mod lights;

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use winit::window::Window;

use crate::animation::{ActionHandle, AnimationMixer, filter_clip};
use crate::app::AppHandler;
use crate::assets::{AssetServer, GltfAsset, LoadStatus, LoadTask, ModelInstance};
use crate::engine::{Engine, FrameState};
use crate::errors::{Result, StageError};
use crate::scene::{NodeHandle, Scene};
use crate::utils::{Clock, OrbitControls};

pub use composer::{StageLayout, apply_avatar_policy, compose};
pub use config::StageConfig;
pub use lights::LightAnimator;

/// Progress of one asset load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

pub struct AvatarStage {
    config: StageConfig,
    layout: StageLayout,
    lights: LightAnimator,
    mixer: AnimationMixer,
    clock: Clock,
    controls: OrbitControls,

    avatar: Option<ModelInstance>,
    action: Option<ActionHandle>,

    model_task: Option<LoadTask<GltfAsset>>,
    animation_task: Option<LoadTask<GltfAsset>>,
    model_state: AssetState,
    animation_state: AssetState,
}

impl AvatarStage {
    /// Builds the static scene into `engine`. Loads start with
    /// [`AvatarStage::start_loading`].
    pub fn new(engine: &mut Engine, config: StageConfig) -> Self {
        let (width, height) = engine.size();
        let aspect = if width > 0 && height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };

        let layout = compose(&mut engine.scene, &mut engine.assets, &config, aspect);

        let seed = config.light_animation.seed.unwrap_or_else(rand::random);
        log::debug!("Light animation seed: {seed}");
        let lights = LightAnimator::new(
            layout.spotlights.clone(),
            config.light_animation.clone(),
            StdRng::seed_from_u64(seed),
        );
        let controls = OrbitControls::from_position(config.camera.position, config.camera.target);

        Self {
            config,
            layout,
            lights,
            mixer: AnimationMixer::new(),
            clock: Clock::new(),
            controls,
            avatar: None,
            action: None,
            model_task: None,
            animation_task: None,
            model_state: AssetState::Idle,
            animation_state: AssetState::Idle,
        }
    }

    /// Starts loading the configured model and animation files.
    pub fn start_loading(&mut self, assets: &AssetServer) {
        log::info!(
            "Loading avatar '{}' and animation '{}'",
            self.config.model_url,
            self.config.animation_url
        );
        self.model_task = Some(assets.load_gltf(&self.config.model_url));
        self.animation_task = Some(assets.load_gltf(&self.config.animation_url));
        self.model_state = AssetState::Loading;
        self.animation_state = AssetState::Loading;
    }

    /// Attaches finished loads. Failures are logged and recorded; the stage
    /// keeps rendering without the missing piece.
    pub fn poll_loads(&mut self, scene: &mut Scene, assets: &mut AssetServer) {
        if let Some(task) = &mut self.model_task {
            match task.poll() {
                LoadStatus::Pending => {}
                LoadStatus::Ready(asset) => {
                    self.model_task = None;
                    self.model_state = match self.attach_avatar(scene, assets, asset) {
                        Ok(_) => AssetState::Ready,
                        Err(err) => {
                            log::error!("Failed to attach avatar: {err}");
                            AssetState::Failed(err.to_string())
                        }
                    };
                }
                LoadStatus::Failed(err) => {
                    log::error!("Failed to load avatar '{}': {err}", task.label());
                    self.model_task = None;
                    self.model_state = AssetState::Failed(err.to_string());
                }
            }
        }

        if let Some(task) = &mut self.animation_task {
            match task.poll() {
                LoadStatus::Pending => {}
                LoadStatus::Ready(asset) => {
                    self.animation_task = None;
                    self.animation_state = match self.set_animation(scene, asset) {
                        Ok(_) => AssetState::Ready,
                        Err(err) => {
                            log::error!("Failed to start animation: {err}");
                            AssetState::Failed(err.to_string())
                        }
                    };
                }
                LoadStatus::Failed(err) => {
                    log::error!("Failed to load animation '{}': {err}", task.label());
                    self.animation_task = None;
                    self.animation_state = AssetState::Failed(err.to_string());
                }
            }
        }
    }

    /// Places `asset` on the stage, replacing the current avatar, and adds
    /// it to the mixer's object group.
    pub fn attach_avatar(&mut self, scene: &mut Scene, assets: &mut AssetServer, asset: GltfAsset) -> Result<NodeHandle> {
        if let Some(previous) = self.avatar.take() {
            self.mixer.remove_object(scene, previous.root);
            previous.despawn(scene, assets);
        }

        let name = asset.name.clone();
        let (instance, _) = asset.instantiate(scene, assets)?;
        apply_avatar_policy(scene, assets, instance.root, &self.config.avatar);
        scene.update();

        self.mixer.add_object(scene, instance.root);
        log::info!(
            "Attached avatar '{name}' ({} meshes, {} skeletons)",
            instance.mesh_nodes.len(),
            instance.skeletons.len()
        );
        let root = instance.root;
        self.avatar = Some(instance);
        Ok(root)
    }

    /// Plays the first clip of `asset`, keeping only root motion and
    /// rotations. The action started by a previous call is replaced in place.
    pub fn set_animation(&mut self, scene: &Scene, asset: GltfAsset) -> Result<ActionHandle> {
        let GltfAsset { name, animations, .. } = asset;
        let clip = animations
            .into_iter()
            .next()
            .ok_or(StageError::MissingAnimation(name))?;
        let clip = Arc::new(filter_clip(clip, &self.config.root_bone));

        log::info!("Playing clip '{}' ({:.2}s)", clip.name, clip.duration);
        let handle = match self.action {
            Some(previous) => self
                .mixer
                .replace_action(scene, previous, clip.clone())
                .unwrap_or_else(|| self.mixer.clip_action(scene, clip)),
            None => self.mixer.clip_action(scene, clip),
        };
        if let Some(action) = self.mixer.action_mut(handle) {
            action.play();
        }
        self.action = Some(handle);
        Ok(handle)
    }

    #[must_use]
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &StageLayout {
        &self.layout
    }

    #[must_use]
    pub fn avatar(&self) -> Option<NodeHandle> {
        self.avatar.as_ref().map(|instance| instance.root)
    }

    #[must_use]
    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    #[must_use]
    pub fn light_animator(&self) -> &LightAnimator {
        &self.lights
    }

    #[must_use]
    pub fn model_state(&self) -> &AssetState {
        &self.model_state
    }

    #[must_use]
    pub fn animation_state(&self) -> &AssetState {
        &self.animation_state
    }
}

impl AppHandler for AvatarStage {
    fn update(&mut self, engine: &mut Engine, _window: &Arc<Window>, frame: &FrameState) {
        self.poll_loads(&mut engine.scene, &mut engine.assets);

        // lights and skeleton advance on the same delta
        let dt = self.clock.get_delta();
        self.lights.update(dt, &mut engine.scene);
        self.mixer.update(dt, &mut engine.scene);

        if let Some((transform, camera)) = engine.scene.active_camera_bundle_mut() {
            let fov = camera.fov;
            self.controls.update(transform, &engine.input, fov, frame.dt);
        }
    }
}
