//! Shared types for the cadence runtime.
//!
//! # Conventions
//! - The world is Z-up. An identity rotation faces +Y; +X is right.
//! - Transforms are plain values; ownership lives with the scene object.

mod types;

pub use types::{ObjectId, PhysicsCategory, Transform};
