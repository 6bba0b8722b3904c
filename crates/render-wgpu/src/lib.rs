//! wgpu render backend.
//!
//! Draws a grid on the ground plane and one lit cube instance per draw call,
//! tinted by the call's material.
//!
//! # Invariants
//! - The renderer only reads the draw list and camera.
//! - Surface loss is recovered by reconfiguring; only unrecoverable surface
//!   errors are reported.

mod context;
mod gpu;
mod mesh;
mod shaders;

pub use context::{GpuContext, RenderError};
pub use gpu::WgpuRenderer;
