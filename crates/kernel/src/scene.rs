use std::collections::HashMap;

use cadence_common::ObjectId;
use cadence_render::DrawList;

use crate::{CollisionInfo, Environment, SceneNode};

/// What the scheduler drives each frame.
pub trait Game {
    fn input(&mut self, delta: f32, env: &mut Environment);

    fn update(&mut self, delta: f32, env: &mut Environment);

    fn render(&self, env: &Environment, draw: &mut DrawList);
}

/// The object graph: nodes in insertion order, addressable by id.
#[derive(Default)]
pub struct Scene {
    nodes: Vec<Box<dyn SceneNode>>,
    index: HashMap<ObjectId, usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: impl SceneNode + 'static) -> ObjectId {
        self.add_boxed(Box::new(node))
    }

    pub fn add_boxed(&mut self, node: Box<dyn SceneNode>) -> ObjectId {
        let id = node.id();
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&dyn SceneNode> {
        let i = *self.index.get(&id)?;
        Some(&*self.nodes[i])
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut (dyn SceneNode + 'static)> {
        let i = *self.index.get(&id)?;
        Some(&mut *self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn SceneNode + 'static)> {
        self.nodes.iter().map(|n| &**n)
    }

    /// Drop every node, remove their bodies from the physics world and
    /// forget the environment's per-scene state.
    pub fn clear(&mut self, env: &mut Environment) {
        let bodies: Vec<_> = env.tracked_bodies().map(|(body, _)| body).collect();
        for &body in &bodies {
            env.untrack_body(body);
            env.physics.remove_body(body);
        }
        tracing::debug!(bodies = bodies.len(), "scene cleared");
        env.clear_lights();
        self.nodes.clear();
        self.index.clear();
    }

    /// Tell both sides of every contact from the last physics step about
    /// each other. Pairs with an untracked side are skipped.
    pub fn dispatch_collisions(&mut self, env: &Environment) {
        for contact in env.physics.contacts() {
            let (Some(a), Some(b)) = (env.body_owner(contact.a), env.body_owner(contact.b)) else {
                continue;
            };
            let (Some(&ia), Some(&ib)) = (self.index.get(&a), self.index.get(&b)) else {
                continue;
            };
            let a_info = CollisionInfo {
                other: a,
                category: self.nodes[ia].category(),
            };
            let b_info = CollisionInfo {
                other: b,
                category: self.nodes[ib].category(),
            };
            tracing::trace!(
                a = %a.short(),
                b = %b.short(),
                a_category = a_info.category.code(),
                b_category = b_info.category.code(),
                "contact"
            );
            self.nodes[ia].handle_collision(b_info);
            self.nodes[ib].handle_collision(a_info);
        }
    }
}

impl Game for Scene {
    fn input(&mut self, delta: f32, env: &mut Environment) {
        for node in &mut self.nodes {
            node.input(delta, env);
        }
    }

    /// Advance physics, deliver contacts, then update every node.
    fn update(&mut self, delta: f32, env: &mut Environment) {
        env.physics.step(delta);
        self.dispatch_collisions(env);
        for node in &mut self.nodes {
            node.update(delta, env);
        }
    }

    fn render(&self, _env: &Environment, draw: &mut DrawList) {
        for node in &self.nodes {
            node.render(draw);
        }
    }
}
