use std::collections::{BTreeMap, HashSet};

use cadence_common::ObjectId;
use cadence_input::InputState;
use cadence_physics::{BodyId, PhysicsBackend};
use cadence_render::Camera;

/// Window size plus a flag raised whenever it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowMetrics {
    pub width: u32,
    pub height: u32,
    pub resized: bool,
}

impl WindowMetrics {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            resized: false,
        }
    }

    /// Record a new size. Setting the same size does not raise the flag.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            tracing::debug!(width, height, "window resized");
            self.width = width;
            self.height = height;
            self.resized = true;
        }
    }

    /// Read and clear the resize flag.
    pub fn take_resized(&mut self) -> bool {
        std::mem::take(&mut self.resized)
    }
}

impl Default for WindowMetrics {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Per-engine shared state handed by `&mut` to every frame phase.
///
/// Owns the physics world; everything else only holds [`BodyId`] handles.
/// Not meant for concurrent mutation.
pub struct Environment {
    pub physics: Box<dyn PhysicsBackend>,
    pub input: InputState,
    pub camera: Camera,
    pub window: WindowMetrics,
    pub active_light: Option<ObjectId>,
    /// Ambient light color, linear RGB.
    pub ambient_light: [f32; 3],
    lights: HashSet<ObjectId>,
    bodies: BTreeMap<BodyId, ObjectId>,
}

impl Environment {
    pub fn new(physics: Box<dyn PhysicsBackend>) -> Self {
        Self {
            physics,
            input: InputState::new(),
            camera: Camera::default(),
            window: WindowMetrics::default(),
            active_light: None,
            ambient_light: [0.2, 0.2, 0.2],
            lights: HashSet::new(),
            bodies: BTreeMap::new(),
        }
    }

    pub fn with_window(mut self, width: u32, height: u32) -> Self {
        self.window = WindowMetrics::new(width, height);
        self.camera.set_viewport(width, height);
        self
    }

    /// Register a light. Registering the same light twice is a no-op.
    pub fn add_light(&mut self, light: ObjectId) {
        self.lights.insert(light);
    }

    pub fn lights(&self) -> &HashSet<ObjectId> {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut HashSet<ObjectId> {
        &mut self.lights
    }

    /// Forget every light, e.g. on scene reset.
    pub fn clear_lights(&mut self) {
        self.lights.clear();
        self.active_light = None;
    }

    /// Record that `body` belongs to `owner`. Returns the previous owner.
    pub fn track_body(&mut self, body: BodyId, owner: ObjectId) -> Option<ObjectId> {
        tracing::debug!(body = body.0, owner = %owner.short(), "body tracked");
        self.bodies.insert(body, owner)
    }

    pub fn untrack_body(&mut self, body: BodyId) -> Option<ObjectId> {
        self.bodies.remove(&body)
    }

    pub fn body_owner(&self, body: BodyId) -> Option<ObjectId> {
        self.bodies.get(&body).copied()
    }

    pub fn tracked_bodies(&self) -> impl Iterator<Item = (BodyId, ObjectId)> + '_ {
        self.bodies.iter().map(|(b, o)| (*b, *o))
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("bodies", &self.physics.body_count())
            .field("lights", &self.lights.len())
            .field("window", &self.window)
            .field("camera", &self.camera)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_physics::SimpleWorld;

    fn env() -> Environment {
        Environment::new(Box::new(SimpleWorld::new()))
    }

    #[test]
    fn lights_are_a_set() {
        let mut env = env();
        let a = ObjectId::new();
        let b = ObjectId::new();
        env.add_light(a);
        env.add_light(a);
        env.add_light(b);
        assert_eq!(env.lights().len(), 2);

        env.lights_mut().remove(&a);
        assert!(!env.lights().contains(&a));
        assert!(env.lights().contains(&b));
    }

    #[test]
    fn clear_lights_on_reset() {
        let mut env = env();
        let a = ObjectId::new();
        env.add_light(a);
        env.active_light = Some(a);
        env.clear_lights();
        assert!(env.lights().is_empty());
        assert!(env.active_light.is_none());
    }

    #[test]
    fn empty_light_set_is_fine() {
        let env = env();
        assert_eq!(env.lights().iter().count(), 0);
    }

    #[test]
    fn body_relation_table() {
        let mut env = env();
        let owner = ObjectId::new();
        assert_eq!(env.track_body(BodyId(3), owner), None);
        assert_eq!(env.body_owner(BodyId(3)), Some(owner));
        assert_eq!(env.body_owner(BodyId(4)), None);
        assert_eq!(env.tracked_bodies().count(), 1);

        assert_eq!(env.untrack_body(BodyId(3)), Some(owner));
        assert_eq!(env.body_owner(BodyId(3)), None);
    }

    #[test]
    fn resize_flag_is_read_and_cleared() {
        let mut env = env().with_window(800, 600);
        assert!(!env.window.take_resized());

        env.window.resize(800, 600);
        assert!(!env.window.take_resized());

        env.window.resize(1024, 768);
        assert!(env.window.take_resized());
        assert!(!env.window.take_resized());
        assert_eq!((env.window.width, env.window.height), (1024, 768));
    }
}
