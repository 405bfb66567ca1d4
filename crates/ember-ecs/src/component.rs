//! Dynamic component storage

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Component carried by every entity that owns a script instance
pub const SCRIPT_COMPONENT: &str = "script";

/// Screen-space UI element component (see [`ember_core::UiRect`])
pub const UI_COMPONENT: &str = "ui";

/// Dynamic components stored as TOML values
///
/// Components are keyed by name and kept sorted so that serializing the
/// same world twice yields identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicComponents {
    /// Component data: component_name -> field data
    pub data: BTreeMap<String, toml::Value>,
}

impl DynamicComponents {
    /// Create empty components
    pub fn new() -> Self {
        Self::default()
    }

    /// Get component data by name
    pub fn get(&self, component: &str) -> Option<&toml::Value> {
        self.data.get(component)
    }

    /// Set component data
    pub fn set(&mut self, component: impl Into<String>, data: toml::Value) {
        self.data.insert(component.into(), data);
    }

    /// Remove a component
    pub fn remove(&mut self, component: &str) -> Option<toml::Value> {
        self.data.remove(component)
    }

    /// Check if a component exists
    pub fn has(&self, component: &str) -> bool {
        self.data.contains_key(component)
    }

    /// Get all component names
    pub fn component_names(&self) -> Vec<&str> {
        self.data.keys().map(|s| s.as_str()).collect()
    }

    /// Get a field value from a component
    pub fn get_field(&self, component: &str, field: &str) -> Option<&toml::Value> {
        self.data.get(component).and_then(|v| v.get(field))
    }

    /// Set a field value in a component
    pub fn set_field(&mut self, component: &str, field: &str, value: toml::Value) {
        let comp = self
            .data
            .entry(component.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));

        if let Some(table) = comp.as_table_mut() {
            table.insert(field.to_string(), value);
        }
    }
}
