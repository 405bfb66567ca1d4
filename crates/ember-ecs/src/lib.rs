//! Ember ECS - Entity Component System with stable IDs
//!
//! This crate wraps hecs with stable entity identifiers, named lookup,
//! dynamic component storage and the per-entity flags the scene
//! lifecycle relies on (active, visible, transient).

mod component;
mod entity;
mod world;

pub use component::{DynamicComponents, SCRIPT_COMPONENT, UI_COMPONENT};
pub use entity::{EntityFlags, EntityInfo};
pub use world::EmberWorld;
