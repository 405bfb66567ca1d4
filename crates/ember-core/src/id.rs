//! Stable entity identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENTITY: AtomicU64 = AtomicU64::new(1);

/// Identifies one spawned entity for the life of the process.
///
/// Ids are never reused, including across scene reloads and swaps: a stale
/// id held by a script or a queued callback resolves to nothing instead of
/// to an entity of the newer scene. Scene files address entities by name,
/// so ids are not persisted.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Allocate the next id
    pub fn next() -> Self {
        Self(NEXT_ENTITY.fetch_add(1, Ordering::Relaxed))
    }

    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_and_never_repeat() {
        let a = EntityId::next();
        let b = EntityId::next();
        assert!(b > a);
        assert_ne!(a, b);
    }

    #[test]
    fn display_and_debug() {
        let id = EntityId::from_raw(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.to_string(), "#42");
        assert_eq!(format!("{id:?}"), "EntityId(42)");
    }
}
