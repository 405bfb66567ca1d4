//! Ember Scene - TOML scene serialization
//!
//! This crate handles loading and saving scenes in TOML format, and
//! exposes the [`SceneSerializer`] boundary the scene controller talks to.

mod format;
mod loader;
mod saver;
mod serializer;

pub use format::{EntityDef, SceneFile, SceneMetadata};
pub use loader::{
    append_scene, append_scene_string, load_scene, load_scene_string, reload_scene,
    reload_scene_string,
};
pub use saver::{save_scene, save_scene_string, scene_name_from_path, world_to_scene_file};
pub use serializer::{SceneSerializer, TomlSceneSerializer};
