//! Rendering adapter: renderer-agnostic frame description.
//!
//! # Invariants
//! - Renderers read transforms through draw calls; they never mutate scene state.
//! - Draw calls are consumed in submission order (back-to-front is the
//!   submitter's job).

mod camera;
mod frame;
mod renderer;

pub use camera::Camera;
pub use frame::{DrawCall, DrawList, Material, Specular};
pub use renderer::{DebugTextRenderer, Renderer};
