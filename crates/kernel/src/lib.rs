//! Runtime kernel: shared environment, scene objects, physics-backed
//! entities and the fixed-timestep frame scheduler.
//!
//! # Invariants
//! - A body-backed entity's transform equals its body's position after every
//!   update phase.
//! - Within one fixed step all input runs before any update; all updates run
//!   before the frame is rendered.
//! - Nothing here owns a rigid body. Bodies are [`BodyId`] handles into the
//!   environment's physics world.
//!
//! [`BodyId`]: cadence_physics::BodyId

pub mod config;
pub mod entity;
pub mod environment;
pub mod object;
pub mod platform;
pub mod scene;
pub mod scheduler;
pub mod timestep;

pub use config::{ConfigError, EngineConfig, WindowConfig};
pub use entity::{EntityTuning, PhysicsEntity, clamp_velocity};
pub use environment::{Environment, WindowMetrics};
pub use object::{Behavior, CollisionInfo, MeshRenderer, SceneNode, SceneObject};
pub use platform::{HeadlessPlatform, Platform, PlatformError};
pub use scene::{Game, Scene};
pub use scheduler::{FrameStats, RunState, Scheduler, SchedulerConfig, SchedulerError};
pub use timestep::{Clock, FixedTimestep, MAX_FRAME_CAP, ManualClock, SystemClock};
