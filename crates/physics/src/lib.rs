//! Physics backend seam.
//!
//! The runtime never owns rigid bodies. It holds [`BodyId`] handles and talks
//! to whichever world implements [`PhysicsBackend`]. Two implementations ship:
//! [`SimpleWorld`], a small gravity + static-slab integrator used by tests and
//! the headless runner, and `RapierWorld` behind the `rapier` feature.
//!
//! # Invariants
//! - Every query on an unknown or removed body returns `None` or does nothing.
//! - `contacts()` reports the pairs touching after the most recent `step`,
//!   one entry per pair, regardless of how many contact points the pair has.

mod simple;

#[cfg(feature = "rapier")]
mod rapier;

use glam::Vec3;
use serde::{Deserialize, Serialize};

#[cfg(feature = "rapier")]
pub use rapier::RapierWorld;
pub use simple::SimpleWorld;

/// Handle to a rigid body owned by a physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Integrated every step, pushed by impulses and gravity.
    Dynamic,
    /// Never moves; other bodies rest on it.
    Static,
}

/// Everything needed to create a box-shaped body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vec3,
    pub half_extents: Vec3,
    pub mass: f32,
}

impl BodyDesc {
    pub fn dynamic(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            position,
            half_extents,
            mass: 1.0,
        }
    }

    pub fn fixed(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            kind: BodyKind::Static,
            position,
            half_extents,
            mass: 0.0,
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }
}

/// Two bodies touching after a step. Order carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: BodyId,
    pub b: BodyId,
}

/// World-level tunables shared by the backends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: Vec3,
    /// Fraction of horizontal velocity removed per second while grounded.
    pub linear_damping: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, 0.0, -9.81),
            linear_damping: 4.0,
        }
    }
}

/// The narrow interface the runtime needs from a rigid-body simulation.
pub trait PhysicsBackend {
    /// Create a body and return its handle.
    fn add_body(&mut self, desc: &BodyDesc) -> BodyId;

    /// Remove a body. Returns false if it was not present.
    fn remove_body(&mut self, body: BodyId) -> bool;

    fn linear_velocity(&self, body: BodyId) -> Option<Vec3>;

    fn set_linear_velocity(&mut self, body: BodyId, velocity: Vec3);

    /// World-space position of the body's center.
    fn translation(&self, body: BodyId) -> Option<Vec3>;

    fn set_translation(&mut self, body: BodyId, position: Vec3);

    /// Instantaneous momentum change through the center of mass.
    fn apply_central_impulse(&mut self, body: BodyId, impulse: Vec3);

    /// Advance the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Touching pairs as of the last `step`.
    fn contacts(&self) -> Vec<Contact>;

    fn body_count(&self) -> usize;
}
