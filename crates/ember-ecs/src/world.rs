//! EmberWorld - ECS world with stable IDs and dynamic components

use crate::component::{DynamicComponents, SCRIPT_COMPONENT, UI_COMPONENT};
use crate::entity::{EntityFlags, EntityInfo};
use bimap::BiMap;
use ember_core::{EmberError, EntityId, Result, UiRect};
use std::collections::{BTreeMap, HashMap};

/// The main ECS world for Ember
///
/// Wraps hecs::World with:
/// - Stable EntityId mapping
/// - Dynamic component storage
/// - Named entity lookup
/// - Lifecycle flags stored as a hecs component
pub struct EmberWorld {
    /// The underlying hecs world
    world: hecs::World,
    /// Bidirectional mapping: EntityId <-> hecs::Entity
    id_map: BiMap<EntityId, hecs::Entity>,
    /// Entity name -> EntityId mapping
    name_map: BTreeMap<String, EntityId>,
    /// EntityId -> name
    names: HashMap<EntityId, String>,
    /// Dynamic components for each entity
    components: HashMap<EntityId, DynamicComponents>,
}

impl Default for EmberWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl EmberWorld {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            id_map: BiMap::new(),
            name_map: BTreeMap::new(),
            names: HashMap::new(),
            components: HashMap::new(),
        }
    }

    /// Spawn a new entity with a name
    pub fn spawn(&mut self, name: impl Into<String>) -> Result<EntityId> {
        self.spawn_with_flags(name, EntityFlags::default())
    }

    /// Spawn a new entity with explicit lifecycle flags
    pub fn spawn_with_flags(&mut self, name: impl Into<String>, flags: EntityFlags) -> Result<EntityId> {
        let name = name.into();

        if self.name_map.contains_key(&name) {
            return Err(EmberError::DuplicateEntityName(name));
        }

        let entity_id = EntityId::next();
        let hecs_entity = self.world.spawn((flags,));

        self.id_map.insert(entity_id, hecs_entity);
        self.names.insert(entity_id, name.clone());
        self.name_map.insert(name, entity_id);
        self.components.insert(entity_id, DynamicComponents::new());

        Ok(entity_id)
    }

    /// Despawn an entity
    pub fn despawn(&mut self, id: EntityId) -> Result<()> {
        let hecs_entity = self
            .id_map
            .get_by_left(&id)
            .copied()
            .ok_or_else(|| EmberError::EntityNotFound(id.to_string()))?;

        self.world
            .despawn(hecs_entity)
            .map_err(|_| EmberError::EntityNotFound(id.to_string()))?;

        if let Some(name) = self.names.remove(&id) {
            self.name_map.remove(&name);
        }
        self.id_map.remove_by_left(&id);
        self.components.remove(&id);

        Ok(())
    }

    /// Get entity ID by name
    pub fn get_id(&self, name: &str) -> Option<EntityId> {
        self.name_map.get(name).copied()
    }

    /// Get entity name by ID
    pub fn get_name(&self, id: EntityId) -> Option<&str> {
        self.names.get(&id).map(|s| s.as_str())
    }

    /// Get components for an entity
    pub fn get_components(&self, id: EntityId) -> Option<&DynamicComponents> {
        self.components.get(&id)
    }

    /// Set a component on an entity
    pub fn set_component(&mut self, id: EntityId, component: &str, data: toml::Value) -> Result<()> {
        let components = self
            .components
            .get_mut(&id)
            .ok_or_else(|| EmberError::EntityNotFound(id.to_string()))?;

        components.set(component, data);
        Ok(())
    }

    /// Get a component from an entity
    pub fn get_component(&self, id: EntityId, component: &str) -> Option<&toml::Value> {
        self.components.get(&id).and_then(|c| c.get(component))
    }

    /// Check whether an entity carries a component
    pub fn has_component(&self, id: EntityId, component: &str) -> bool {
        self.components
            .get(&id)
            .map(|c| c.has(component))
            .unwrap_or(false)
    }

    /// Get an entity's lifecycle flags
    pub fn flags(&self, id: EntityId) -> Option<EntityFlags> {
        let entity = self.id_map.get_by_left(&id)?;
        self.world.get::<&EntityFlags>(*entity).ok().map(|f| *f)
    }

    fn update_flags(&mut self, id: EntityId, apply: impl FnOnce(&mut EntityFlags)) -> Result<()> {
        let entity = self
            .id_map
            .get_by_left(&id)
            .copied()
            .ok_or_else(|| EmberError::EntityNotFound(id.to_string()))?;
        let mut flags = self
            .world
            .get::<&mut EntityFlags>(entity)
            .map_err(|_| EmberError::EntityNotFound(id.to_string()))?;
        apply(&mut *flags);
        Ok(())
    }

    /// Mark an entity active or inactive
    pub fn set_active(&mut self, id: EntityId, active: bool) -> Result<()> {
        self.update_flags(id, |f| f.active = active)
    }

    /// Show or hide an entity
    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> Result<()> {
        self.update_flags(id, |f| f.visible = visible)
    }

    /// Mark an entity as engine-owned so it is never serialized
    pub fn set_transient(&mut self, id: EntityId, transient: bool) -> Result<()> {
        self.update_flags(id, |f| f.transient = transient)
    }

    /// Read the `ui` component of an entity as a rect
    pub fn ui_rect(&self, id: EntityId) -> Option<UiRect> {
        self.get_component(id, UI_COMPONENT)
            .and_then(UiRect::from_component)
    }

    /// Overwrite the `ui` component of an entity
    pub fn set_ui_rect(&mut self, id: EntityId, rect: UiRect) -> Result<()> {
        self.set_component(id, UI_COMPONENT, rect.to_component())
    }

    /// All entity ids in spawn order
    pub fn entity_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.name_map.values().copied().collect();
        ids.sort();
        ids
    }

    /// Ids of entities carrying a component, in spawn order
    pub fn entities_with(&self, component: &str) -> Vec<EntityId> {
        self.entity_ids()
            .into_iter()
            .filter(|id| self.has_component(*id, component))
            .collect()
    }

    /// Ids of every entity owning a script instance, in spawn order
    pub fn script_entities(&self) -> Vec<EntityId> {
        self.entities_with(SCRIPT_COMPONENT)
    }

    /// Get info about all entities, in spawn order
    pub fn all_entities(&self) -> Vec<EntityInfo> {
        self.entity_ids()
            .into_iter()
            .map(|id| {
                let name = self.get_name(id).unwrap_or_default().to_string();
                let components = self
                    .components
                    .get(&id)
                    .map(|c| c.component_names().into_iter().map(String::from).collect())
                    .unwrap_or_default();
                EntityInfo::new(id, name)
                    .with_components(components)
                    .with_flags(self.flags(id).unwrap_or_default())
            })
            .collect()
    }

    /// Get number of entities
    pub fn entity_count(&self) -> usize {
        self.name_map.len()
    }

    /// Check if an entity exists
    pub fn contains(&self, id: EntityId) -> bool {
        self.id_map.contains_left(&id)
    }

    /// Check if an entity with name exists
    pub fn contains_name(&self, name: &str) -> bool {
        self.name_map.contains_key(name)
    }

    /// Clear the world
    pub fn clear(&mut self) {
        self.world.clear();
        self.id_map.clear();
        self.name_map.clear();
        self.names.clear();
        self.components.clear();
    }
}
