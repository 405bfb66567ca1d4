//! Ember Player - run a scene through the lifecycle controller
//!
//! Usage:
//!   ember-player [scene.toml] [--config <path>] [--editor] [--frames N]
//!                [--fixed-hz HZ] [--fullscreen]

use anyhow::{bail, Context, Result};
use clap::Parser;
use ember_player::{headless_registry, ConfigOverrides, EngineConfig, HeadlessWindow, RunLoop};
use ember_runtime::{NullScriptRuntime, SceneLifecycleController};
use ember_scene::TomlSceneSerializer;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ember-player")]
#[command(about = "Ember player - run scenes with a fixed-step simulation clock")]
struct Args {
    /// Path to scene file (defaults to run.start_scene from config)
    scene: Option<PathBuf>,

    /// Config file to use instead of ./ember.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run with editor bindings and diagnostics
    #[arg(long)]
    editor: bool,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Fixed simulation rate in Hz
    #[arg(long)]
    fixed_hz: Option<f64>,

    /// Launch in fullscreen mode
    #[arg(long)]
    fullscreen: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config =
        EngineConfig::load(args.config.as_deref()).context("Failed to load engine config")?;
    ConfigOverrides {
        editor: args.editor,
        fixed_hz: args.fixed_hz,
        fullscreen: args.fullscreen,
    }
    .apply(&mut config);
    config.validate().context("Invalid engine config")?;

    let Some(scene) = args.scene.or_else(|| config.run.start_scene.clone()) else {
        bail!("No scene given and run.start_scene is not set");
    };

    let systems = headless_registry().context("Failed to register subsystems")?;
    let controller = SceneLifecycleController::new(
        systems,
        Box::new(NullScriptRuntime),
        Box::new(TomlSceneSerializer::new()),
    )
    .with_build_mode(config.run.build_mode)
    .with_loading_config(config.loading.clone());

    let mut window = HeadlessWindow::new()
        .with_frame_pacing(Duration::from_secs_f64(1.0 / config.run.fixed_hz));
    if let Some(frames) = args.frames {
        window = window.with_frame_limit(frames);
    }

    log::info!(
        "{} ({}x{}{})",
        config.window.title,
        config.window.width,
        config.window.height,
        if config.window.fullscreen { ", fullscreen" } else { "" }
    );

    let mut run = RunLoop::new(config.clock(), controller, window);
    run.load_start_scene(&scene)
        .with_context(|| format!("Failed to load scene {}", scene.display()))?;

    log::info!("Entities: {}", run.controller().world().entity_count());

    run.run();

    Ok(())
}
