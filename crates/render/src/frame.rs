use cadence_assets::{MeshHandle, TextureHandle};
use cadence_common::ObjectId;
use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Specular response. Zeroed means matte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Specular {
    pub intensity: f32,
    pub exponent: f32,
}

/// Surface description bound before a draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub diffuse: TextureHandle,
    pub specular: Specular,
    /// Multiplied into the diffuse texture; also the flat color when the
    /// backend does not sample textures.
    pub tint: [f32; 4],
}

impl Material {
    pub fn new(diffuse: TextureHandle) -> Self {
        Self {
            diffuse,
            specular: Specular::default(),
            tint: [0.8, 0.8, 0.8, 1.0],
        }
    }

    pub fn with_tint(mut self, tint: [f32; 4]) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_specular(mut self, specular: Specular) -> Self {
        self.specular = specular;
        self
    }
}

/// One mesh drawn once with one material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub owner: ObjectId,
    pub mesh: MeshHandle,
    pub material: Material,
    pub model: Mat4,
}

/// Draw calls for one rendered frame, in submission order.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    calls: Vec<DrawCall>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn push(&mut self, call: DrawCall) {
        self.calls.push(call);
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}
