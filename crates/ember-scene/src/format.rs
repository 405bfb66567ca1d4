//! Scene file format definitions
//!
//! ```toml
//! [scene]
//! name = "Arena"
//!
//! [entities.gate]
//! visible = false
//!
//! [entities.gate.door]
//! locked = true
//! ```
//!
//! Entities and components are kept in sorted maps so that saving the same
//! world twice produces the same bytes.

use ember_ecs::EntityFlags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root structure of a scene TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    pub scene: SceneMetadata,
    #[serde(default)]
    pub entities: BTreeMap<String, EntityDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMetadata {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// One entity of a scene file.
///
/// `active` and `visible` are only written when false. Every other key of
/// the entity table is a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub active: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub visible: bool,
    #[serde(flatten)]
    pub components: BTreeMap<String, toml::Value>,
}

impl EntityDef {
    /// Entity with the given flags and components. The transient flag is
    /// not part of the file format and is dropped.
    pub fn from_parts(flags: EntityFlags, components: BTreeMap<String, toml::Value>) -> Self {
        Self {
            active: flags.active,
            visible: flags.visible,
            components,
        }
    }

    /// Flags an entity spawned from this definition starts with
    pub fn flags(&self) -> EntityFlags {
        EntityFlags {
            active: self.active,
            visible: self.visible,
            transient: false,
        }
    }
}

impl Default for EntityDef {
    fn default() -> Self {
        Self::from_parts(EntityFlags::default(), BTreeMap::new())
    }
}

impl SceneFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scene: SceneMetadata {
                name: name.into(),
                version: default_version(),
                description: None,
            },
            entities: BTreeMap::new(),
        }
    }

    pub fn add_entity(&mut self, name: impl Into<String>, entity: EntityDef) {
        self.entities.insert(name.into(), entity);
    }
}
