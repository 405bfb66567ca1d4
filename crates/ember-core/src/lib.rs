//! Ember Core - Foundational types for the Ember engine
//!
//! This crate provides the core types that all other Ember crates depend on:
//! - `EntityId` - Stable entity identifiers
//! - `SnapshotDigest` - SHA-256 digest of serialized scene state
//! - `Vec2`, `Vec3`, `UiRect` - Small value types used by scene data
//! - Error types and Result alias

mod digest;
mod error;
mod id;
mod types;

pub use digest::SnapshotDigest;
pub use error::{EmberError, Result};
pub use id::EntityId;
pub use types::{UiRect, Vec2, Vec3};
