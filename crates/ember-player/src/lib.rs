//! Ember Player - run loop and engine configuration
//!
//! This crate provides the `RunLoop` that drives a `SceneLifecycleController`
//! from a `Window`, the layered `EngineConfig`, and a headless window for
//! running scenes without a display.

mod config;
mod headless;
mod run_loop;

pub use config::{
    ConfigOverrides, EngineConfig, GraphicsQuality, RunConfig, WindowConfig, PROJECT_CONFIG,
};
pub use headless::{headless_registry, HeadlessSubsystem, HeadlessWindow};
pub use run_loop::{RunLoop, Window, EDITOR_BINDINGS};
