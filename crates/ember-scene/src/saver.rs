//! Scene saving to TOML files

use crate::format::{EntityDef, SceneFile};
use ember_core::Result;
use ember_ecs::EmberWorld;
use std::fs;
use std::path::Path;

/// Save a world to a scene file
pub fn save_scene<P: AsRef<Path>>(path: P, world: &EmberWorld, name: impl Into<String>) -> Result<()> {
    let path = path.as_ref();
    let content = save_scene_string(world, name)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Save a world to a TOML string
pub fn save_scene_string(world: &EmberWorld, name: impl Into<String>) -> Result<String> {
    let scene_file = world_to_scene_file(world, name);
    let content = toml::to_string_pretty(&scene_file)?;
    Ok(content)
}

/// Convert an EmberWorld to a SceneFile
///
/// Transient entities are engine-owned and are left out.
pub fn world_to_scene_file(world: &EmberWorld, name: impl Into<String>) -> SceneFile {
    let mut scene = SceneFile::new(name);

    for info in world.all_entities() {
        if info.flags.transient {
            continue;
        }

        let components = world
            .get_components(info.id)
            .map(|c| c.data.clone())
            .unwrap_or_default();
        let entity_def = EntityDef::from_parts(info.flags, components);

        scene.add_entity(info.name, entity_def);
    }

    scene
}

/// Derive a scene name from its file path
///
/// `levels/Boss Arena.scene.toml.temp` becomes `Boss Arena`, so a scene and
/// its play snapshot carry the same name.
pub fn scene_name_from_path(path: &Path) -> String {
    let mut name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled");

    for suffix in [".temp", ".toml", ".scene"] {
        name = name.strip_suffix(suffix).unwrap_or(name);
    }

    if name.is_empty() {
        "Untitled".to_string()
    } else {
        name.to_string()
    }
}
