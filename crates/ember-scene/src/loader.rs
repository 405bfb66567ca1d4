//! Scene loading from TOML files

use crate::format::SceneFile;
use ember_core::{EmberError, Result};
use ember_ecs::EmberWorld;
use std::fs;
use std::path::Path;

/// Load a scene from a TOML file into a fresh world
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<(EmberWorld, SceneFile)> {
    let content = fs::read_to_string(path)?;
    load_scene_string(&content)
}

/// Load a scene from a TOML string into a fresh world
pub fn load_scene_string(content: &str) -> Result<(EmberWorld, SceneFile)> {
    let mut world = EmberWorld::new();
    let scene_file = append_scene_string(content, &mut world)?;
    Ok((world, scene_file))
}

/// Spawn a scene file's entities into an existing world
///
/// Existing entities are kept. Fails without touching the world if any
/// entity name in the file is already taken.
pub fn append_scene<P: AsRef<Path>>(path: P, world: &mut EmberWorld) -> Result<SceneFile> {
    let content = fs::read_to_string(path)?;
    append_scene_string(&content, world)
}

/// Spawn a scene string's entities into an existing world
pub fn append_scene_string(content: &str, world: &mut EmberWorld) -> Result<SceneFile> {
    let scene_file: SceneFile = toml::from_str(content)?;
    apply(&scene_file, world)?;
    Ok(scene_file)
}

/// Reload a scene file, replacing the world's contents in place
pub fn reload_scene<P: AsRef<Path>>(path: P, world: &mut EmberWorld) -> Result<SceneFile> {
    let content = fs::read_to_string(path)?;
    reload_scene_string(&content, world)
}

/// Reload a scene from a string, replacing the world's contents in place
///
/// The string is parsed before the world is cleared, so a malformed file
/// leaves the current world intact.
pub fn reload_scene_string(content: &str, world: &mut EmberWorld) -> Result<SceneFile> {
    let scene_file: SceneFile = toml::from_str(content)?;

    world.clear();
    apply(&scene_file, world)?;

    Ok(scene_file)
}

fn apply(scene_file: &SceneFile, world: &mut EmberWorld) -> Result<()> {
    if let Some(name) = scene_file.entities.keys().find(|name| world.contains_name(name)) {
        return Err(EmberError::DuplicateEntityName(name.clone()));
    }

    for (name, entity_def) in &scene_file.entities {
        let id = world.spawn_with_flags(name.clone(), entity_def.flags())?;

        for (comp_name, comp_data) in &entity_def.components {
            world.set_component(id, comp_name, comp_data.clone())?;
        }
    }

    log::debug!(
        "applied scene '{}' ({} entities)",
        scene_file.scene.name,
        scene_file.entities.len()
    );

    Ok(())
}
