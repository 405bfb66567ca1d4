//! Small value types shared by scene data

use serde::{Deserialize, Serialize};

/// A 2D vector
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_array(arr: [f32; 2]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
        }
    }

    pub fn to_array(&self) -> [f32; 2] {
        [self.x, self.y]
    }
}

/// A 3D vector
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(arr: [f32; 3]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
            z: arr[2],
        }
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Screen-space rectangle of a UI element, in normalized viewport units.
///
/// Stored on entities as the `ui` component:
///
/// ```toml
/// [entities."Loading Bar".ui]
/// position = [0.16, 0.1, 0.0]
/// size = [0.68, 0.04]
/// ```
///
/// `dirty` tells the UI subsystem that the element must be re-batched on its
/// next update.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiRect {
    #[serde(with = "vec3_array")]
    pub position: Vec3,
    #[serde(with = "vec2_array")]
    pub size: Vec2,
    #[serde(default)]
    pub dirty: bool,
}

impl Default for UiRect {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            size: Vec2::ONE,
            dirty: false,
        }
    }
}

impl UiRect {
    pub fn new(position: Vec3, size: Vec2) -> Self {
        Self {
            position,
            size,
            dirty: true,
        }
    }

    /// Read a rect from a `ui` component value
    pub fn from_component(value: &toml::Value) -> Option<Self> {
        value.clone().try_into().ok()
    }

    /// Convert back into a component value
    pub fn to_component(&self) -> toml::Value {
        toml::Value::try_from(self).unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
    }
}

mod vec2_array {
    use super::Vec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Vec2, s: S) -> Result<S::Ok, S::Error> {
        v.to_array().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec2, D::Error> {
        <[f32; 2]>::deserialize(d).map(Vec2::from_array)
    }
}

mod vec3_array {
    use super::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Vec3, s: S) -> Result<S::Ok, S::Error> {
        v.to_array().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec3, D::Error> {
        <[f32; 3]>::deserialize(d).map(Vec3::from_array)
    }
}
