//! Entity information and metadata

use ember_core::EntityId;
use serde::{Deserialize, Serialize};

/// Per-entity lifecycle flags, stored as a hecs component on every entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityFlags {
    /// Inactive entities are skipped by gameplay subsystems
    pub active: bool,
    /// Invisible entities are skipped by render and UI
    pub visible: bool,
    /// Transient entities belong to the engine (e.g. the loading screen)
    /// and are never written to a scene file
    pub transient: bool,
}

impl Default for EntityFlags {
    fn default() -> Self {
        Self {
            active: true,
            visible: true,
            transient: false,
        }
    }
}

/// Information about an entity for queries and serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityInfo {
    /// The stable entity ID
    pub id: EntityId,
    /// Human-readable name
    pub name: String,
    /// Component names present on this entity
    pub components: Vec<String>,
    /// Lifecycle flags
    pub flags: EntityFlags,
}

impl EntityInfo {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            components: Vec::new(),
            flags: EntityFlags::default(),
        }
    }

    pub fn with_components(mut self, components: Vec<String>) -> Self {
        self.components = components;
        self
    }

    pub fn with_flags(mut self, flags: EntityFlags) -> Self {
        self.flags = flags;
        self
    }
}
