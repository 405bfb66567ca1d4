//! Serializer boundary used by the scene controller

use crate::loader::{append_scene, reload_scene};
use crate::saver::{save_scene, scene_name_from_path};
use ember_core::Result;
use ember_ecs::EmberWorld;
use std::path::Path;

/// Reads and writes a world from and to scene files
pub trait SceneSerializer: Send {
    /// Write every non-transient entity of the world to `path`
    fn serialize(&mut self, world: &EmberWorld, path: &Path) -> Result<()>;

    /// Append the entities stored at `path` to the world
    fn deserialize(&mut self, world: &mut EmberWorld, path: &Path) -> Result<()>;

    /// Replace the world's contents with the entities stored at `path`
    fn reload(&mut self, world: &mut EmberWorld, path: &Path) -> Result<()>;
}

/// [`SceneSerializer`] backed by TOML scene files
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlSceneSerializer;

impl TomlSceneSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl SceneSerializer for TomlSceneSerializer {
    fn serialize(&mut self, world: &EmberWorld, path: &Path) -> Result<()> {
        save_scene(path, world, scene_name_from_path(path))
    }

    fn deserialize(&mut self, world: &mut EmberWorld, path: &Path) -> Result<()> {
        append_scene(path, world).map(|_| ())
    }

    fn reload(&mut self, world: &mut EmberWorld, path: &Path) -> Result<()> {
        reload_scene(path, world).map(|_| ())
    }
}
