use std::fmt::Write as _;

use crate::{Camera, DrawList};

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer consumes a finished draw list and a camera and produces
/// output. It never touches scene objects; object state is kernel-owned.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given draw list and camera.
    fn render(&self, frame: &DrawList, camera: &Camera) -> Self::Output;
}

/// Text renderer for headless runs and tests.
///
/// Produces one line per draw call, in submission order.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &DrawList, camera: &Camera) -> String {
        tracing::trace!(draws = frame.len(), "debug frame");
        let mut out = String::new();
        let _ = writeln!(out, "=== Frame ({} draws) ===", frame.len());
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            camera.eye.x,
            camera.eye.y,
            camera.eye.z,
            camera.target.x,
            camera.target.y,
            camera.target.z,
            camera.fov_degrees
        );

        for call in frame.calls() {
            let p = call.model.w_axis;
            let _ = writeln!(
                out,
                "  [{}] mesh={} tex={} pos=({:.2}, {:.2}, {:.2})",
                call.owner.short(),
                call.mesh.0.0,
                call.material.diffuse.0.0,
                p.x,
                p.y,
                p.z
            );
        }

        out
    }
}
