//! Input state management

use std::collections::{HashMap, HashSet};

/// A keyboard key, independent of the windowing backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    F5,
    F6,
    F7,
    F8,
    Semicolon,
    Escape,
    Char(char),
}

/// Tracks keyboard state per frame
pub struct InputState {
    /// Keys currently held down
    keys_down: HashSet<Key>,
    /// Keys pressed this frame
    keys_just_pressed: HashSet<Key>,
    /// Keys released this frame
    keys_just_released: HashSet<Key>,

    /// Action map: action name -> list of key bindings
    action_map: HashMap<String, Vec<Key>>,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            keys_just_released: HashSet::new(),
            action_map: Self::default_action_map(),
        }
    }

    fn default_action_map() -> HashMap<String, Vec<Key>> {
        let mut map = HashMap::new();
        // Editor toolbar
        map.insert("editor_play".into(), vec![Key::F5]);
        map.insert("editor_pause".into(), vec![Key::F6]);
        map.insert("editor_stop".into(), vec![Key::F7]);
        map.insert("editor_reload".into(), vec![Key::F8]);
        map.insert("editor_preview".into(), vec![Key::Semicolon]);
        map.insert("quit".into(), vec![Key::Escape]);
        map
    }

    /// Bind an action to one or more keys
    pub fn bind_action(&mut self, action: impl Into<String>, keys: Vec<Key>) {
        self.action_map.insert(action.into(), keys);
    }

    /// Process a key press event
    pub fn process_key_down(&mut self, key: Key) {
        if !self.keys_down.contains(&key) {
            self.keys_just_pressed.insert(key);
        }
        self.keys_down.insert(key);
    }

    /// Process a key release event
    pub fn process_key_up(&mut self, key: Key) {
        self.keys_down.remove(&key);
        self.keys_just_released.insert(key);
    }

    /// Call at end of frame to clear per-frame state
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
        self.keys_just_released.clear();
    }

    // --- Query methods ---

    /// Is a key currently held down?
    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Was a key pressed this frame?
    pub fn is_key_just_pressed(&self, key: Key) -> bool {
        self.keys_just_pressed.contains(&key)
    }

    /// Was a key released this frame?
    pub fn is_key_just_released(&self, key: Key) -> bool {
        self.keys_just_released.contains(&key)
    }

    /// Is an action currently held? (any bound key is down)
    pub fn is_action_pressed(&self, action: &str) -> bool {
        self.action_map
            .get(action)
            .map(|keys| keys.iter().any(|k| self.keys_down.contains(k)))
            .unwrap_or(false)
    }

    /// Was an action just pressed this frame?
    pub fn is_action_just_pressed(&self, action: &str) -> bool {
        self.action_map
            .get(action)
            .map(|keys| keys.iter().any(|k| self.keys_just_pressed.contains(k)))
            .unwrap_or(false)
    }

    /// Get all actions that were just pressed this frame
    pub fn actions_just_pressed(&self) -> Vec<String> {
        let mut result: Vec<String> = self
            .action_map
            .iter()
            .filter(|(_, keys)| keys.iter().any(|k| self.keys_just_pressed.contains(k)))
            .map(|(action, _)| action.clone())
            .collect();
        result.sort();
        result
    }
}
