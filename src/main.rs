#[cfg(not(target_arch = "wasm32"))]
fn main() -> avatar_stage::Result<()> {
    use avatar_stage::{App, AvatarStage, StageConfig};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => StageConfig::load(path)?,
        None => StageConfig::default(),
    };

    App::new()
        .with_title(config.title.clone())
        .with_settings(config.render.to_render_settings())
        .run(move |engine, _window| {
            let mut stage = AvatarStage::new(engine, config);
            stage.start_loading(&engine.assets);
            stage
        })
}

// The browser build starts from the library's `wasm_bindgen(start)` hook.
#[cfg(target_arch = "wasm32")]
fn main() {}
