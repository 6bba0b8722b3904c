use std::collections::BTreeMap;

use glam::Vec3;

use crate::{BodyDesc, BodyId, BodyKind, Contact, PhysicsBackend, PhysicsSettings};

/// Distance below which a body counts as resting on a slab.
const CONTACT_SLOP: f32 = 1.0e-4;

#[derive(Debug, Clone)]
struct SimpleBody {
    kind: BodyKind,
    position: Vec3,
    velocity: Vec3,
    half_extents: Vec3,
    inverse_mass: f32,
}

/// Reference backend: explicit Euler integration under gravity with static
/// axis-aligned slabs to stand on.
///
/// Dynamic bodies collide with static bodies only, and only from above. That
/// is all the runtime needs to exercise ground contact, impulses and velocity
/// clamping deterministically; anything richer belongs to a real engine.
#[derive(Debug, Clone, Default)]
pub struct SimpleWorld {
    settings: PhysicsSettings,
    bodies: BTreeMap<BodyId, SimpleBody>,
    next_id: u32,
    contacts: Vec<Contact>,
}

impl SimpleWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: PhysicsSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }
}

fn overlaps_xy(a_pos: Vec3, a_half: Vec3, b_pos: Vec3, b_half: Vec3) -> bool {
    (a_pos.x - b_pos.x).abs() <= a_half.x + b_half.x
        && (a_pos.y - b_pos.y).abs() <= a_half.y + b_half.y
}

impl PhysicsBackend for SimpleWorld {
    fn add_body(&mut self, desc: &BodyDesc) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        let inverse_mass = match desc.kind {
            BodyKind::Dynamic if desc.mass > 0.0 => 1.0 / desc.mass,
            _ => 0.0,
        };
        self.bodies.insert(
            id,
            SimpleBody {
                kind: desc.kind,
                position: desc.position,
                velocity: Vec3::ZERO,
                half_extents: desc.half_extents,
                inverse_mass,
            },
        );
        tracing::debug!(body = id.0, kind = ?desc.kind, "body added");
        id
    }

    fn remove_body(&mut self, body: BodyId) -> bool {
        self.contacts.retain(|c| c.a != body && c.b != body);
        self.bodies.remove(&body).is_some()
    }

    fn linear_velocity(&self, body: BodyId) -> Option<Vec3> {
        self.bodies.get(&body).map(|b| b.velocity)
    }

    fn set_linear_velocity(&mut self, body: BodyId, velocity: Vec3) {
        if let Some(b) = self.bodies.get_mut(&body) {
            if b.kind == BodyKind::Dynamic {
                b.velocity = velocity;
            }
        }
    }

    fn translation(&self, body: BodyId) -> Option<Vec3> {
        self.bodies.get(&body).map(|b| b.position)
    }

    fn set_translation(&mut self, body: BodyId, position: Vec3) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.position = position;
        }
    }

    fn apply_central_impulse(&mut self, body: BodyId, impulse: Vec3) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.velocity += impulse * b.inverse_mass;
        }
    }

    fn step(&mut self, dt: f32) {
        self.contacts.clear();

        let slabs: Vec<(BodyId, Vec3, Vec3)> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.kind == BodyKind::Static)
            .map(|(id, b)| (*id, b.position, b.half_extents))
            .collect();

        let gravity = self.settings.gravity;
        let damping = (1.0 - self.settings.linear_damping * dt).max(0.0);

        for (id, body) in self.bodies.iter_mut() {
            if body.kind != BodyKind::Dynamic {
                continue;
            }

            body.velocity += gravity * dt;
            body.position += body.velocity * dt;

            let mut grounded = false;
            for &(slab_id, slab_pos, slab_half) in &slabs {
                if !overlaps_xy(body.position, body.half_extents, slab_pos, slab_half) {
                    continue;
                }
                let top = slab_pos.z + slab_half.z;
                let bottom = body.position.z - body.half_extents.z;
                if bottom > top + CONTACT_SLOP || body.position.z < slab_pos.z {
                    continue;
                }
                body.position.z = body.position.z.max(top + body.half_extents.z);
                if body.velocity.z < 0.0 {
                    body.velocity.z = 0.0;
                }
                grounded = true;
                self.contacts.push(Contact {
                    a: *id,
                    b: slab_id,
                });
            }

            if grounded {
                body.velocity.x *= damping;
                body.velocity.y *= damping;
            }
        }
    }

    fn contacts(&self) -> Vec<Contact> {
        self.contacts.clone()
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
