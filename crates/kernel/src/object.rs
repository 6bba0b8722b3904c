use cadence_assets::MeshHandle;
use cadence_common::{ObjectId, PhysicsCategory, Transform};
use cadence_render::{DrawCall, DrawList, Material};

use crate::Environment;

/// A unit of per-object logic attached to a [`SceneObject`].
///
/// Every hook defaults to doing nothing, so a behavior only implements the
/// phases it cares about. Only `update` may change the owner's transform.
pub trait Behavior {
    fn input(&mut self, _delta: f32, _transform: &Transform, _env: &mut Environment) {}

    fn update(&mut self, _delta: f32, _transform: &mut Transform, _env: &mut Environment) {}

    fn render(&self, _owner: ObjectId, _transform: &Transform, _draw: &mut DrawList) {}
}

/// The other side of a contact, as seen by the node being notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionInfo {
    pub other: ObjectId,
    pub category: PhysicsCategory,
}

/// A transform plus an ordered list of owned behaviors.
pub struct SceneObject {
    id: ObjectId,
    pub transform: Transform,
    pub category: PhysicsCategory,
    behaviors: Vec<Box<dyn Behavior>>,
}

impl SceneObject {
    pub fn new(transform: Transform) -> Self {
        Self {
            id: ObjectId::new(),
            transform,
            category: PhysicsCategory::Unclassified,
            behaviors: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: PhysicsCategory) -> Self {
        self.category = category;
        self
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Take ownership of `behavior`. It joins every phase from now on, after
    /// the behaviors already attached.
    pub fn add_component(&mut self, behavior: impl Behavior + 'static) {
        self.behaviors.push(Box::new(behavior));
    }

    pub fn component_count(&self) -> usize {
        self.behaviors.len()
    }

    pub fn input(&mut self, delta: f32, env: &mut Environment) {
        for behavior in &mut self.behaviors {
            behavior.input(delta, &self.transform, env);
        }
    }

    pub fn update(&mut self, delta: f32, env: &mut Environment) {
        for behavior in &mut self.behaviors {
            behavior.update(delta, &mut self.transform, env);
        }
    }

    pub fn render(&self, draw: &mut DrawList) {
        for behavior in &self.behaviors {
            behavior.render(self.id, &self.transform, draw);
        }
    }
}

impl std::fmt::Debug for SceneObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneObject")
            .field("id", &self.id)
            .field("transform", &self.transform)
            .field("category", &self.category)
            .field("behaviors", &self.behaviors.len())
            .finish()
    }
}

/// Anything the scene can drive through the frame phases.
///
/// Node types add their own logic by overriding a phase and then calling
/// into the wrapped [`SceneObject`].
pub trait SceneNode {
    fn object(&self) -> &SceneObject;

    fn object_mut(&mut self) -> &mut SceneObject;

    fn id(&self) -> ObjectId {
        self.object().id()
    }

    fn category(&self) -> PhysicsCategory {
        self.object().category
    }

    fn input(&mut self, delta: f32, env: &mut Environment) {
        self.object_mut().input(delta, env);
    }

    fn update(&mut self, delta: f32, env: &mut Environment) {
        self.object_mut().update(delta, env);
    }

    fn render(&self, draw: &mut DrawList) {
        self.object().render(draw);
    }

    /// Called once per contact pair per physics step.
    fn handle_collision(&mut self, _contact: CollisionInfo) {}
}

impl SceneNode for SceneObject {
    fn object(&self) -> &SceneObject {
        self
    }

    fn object_mut(&mut self) -> &mut SceneObject {
        self
    }
}

/// Draws one mesh with one material at the owner's transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshRenderer {
    pub mesh: MeshHandle,
    pub material: Material,
}

impl MeshRenderer {
    pub fn new(mesh: MeshHandle, material: Material) -> Self {
        Self { mesh, material }
    }
}

impl Behavior for MeshRenderer {
    fn render(&self, owner: ObjectId, transform: &Transform, draw: &mut DrawList) {
        draw.push(DrawCall {
            owner,
            mesh: self.mesh,
            material: self.material,
            model: transform.matrix(),
        });
    }
}
