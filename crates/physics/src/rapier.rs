//! rapier3d-backed physics world.
//!
//! Body handles are dense indices into `handles`; the rapier body's
//! `user_data` carries the same index back so contact pairs can be mapped to
//! [`BodyId`]s without a reverse table.
//!
//! Rapier's own linear damping is left off. `linear_damping` is applied after
//! each step to horizontal velocity of dynamic bodies touching a fixed body,
//! the same rule [`crate::SimpleWorld`] uses.

use std::collections::HashSet;

use glam::Vec3;
use rapier3d::prelude::*;

use crate::{BodyDesc, BodyId, BodyKind, Contact, PhysicsBackend, PhysicsSettings};

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// A rapier3d world owning its pipeline and every body set.
pub struct RapierWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    handles: Vec<Option<RigidBodyHandle>>,
    linear_damping: Real,
}

impl RapierWorld {
    pub fn new() -> Self {
        Self::with_settings(PhysicsSettings::default())
    }

    pub fn with_settings(settings: PhysicsSettings) -> Self {
        Self {
            gravity: to_vector(settings.gravity),
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            handles: Vec::new(),
            linear_damping: settings.linear_damping,
        }
    }

    fn handle(&self, body: BodyId) -> Option<RigidBodyHandle> {
        self.handles.get(body.0 as usize).copied().flatten()
    }

    /// Dynamic bodies with an active contact against a fixed body.
    fn grounded_bodies(&self) -> HashSet<RigidBodyHandle> {
        self.narrow_phase
            .contact_pairs()
            .filter(|pair| pair.has_any_active_contact)
            .filter_map(|pair| {
                let a = self.colliders.get(pair.collider1)?.parent()?;
                let b = self.colliders.get(pair.collider2)?.parent()?;
                match (self.bodies.get(a)?.is_fixed(), self.bodies.get(b)?.is_fixed()) {
                    (false, true) => Some(a),
                    (true, false) => Some(b),
                    _ => None,
                }
            })
            .collect()
    }

    fn damp_grounded(&mut self, dt: f32) {
        let factor = (1.0 - self.linear_damping * dt).max(0.0);
        if factor >= 1.0 {
            return;
        }
        for handle in self.grounded_bodies() {
            if let Some(body) = self.bodies.get_mut(handle) {
                let v = *body.linvel();
                body.set_linvel(vector![v.x * factor, v.y * factor, v.z], true);
            }
        }
    }

    fn body_of_collider(&self, collider: ColliderHandle) -> Option<BodyId> {
        let parent = self.colliders.get(collider)?.parent()?;
        let body = self.bodies.get(parent)?;
        Some(BodyId(body.user_data as u32))
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsBackend for RapierWorld {
    fn add_body(&mut self, desc: &BodyDesc) -> BodyId {
        let id = BodyId(self.handles.len() as u32);
        let builder = match desc.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic().lock_rotations(),
            BodyKind::Static => RigidBodyBuilder::fixed(),
        };
        let rigid_body = builder
            .translation(to_vector(desc.position))
            .user_data(id.0 as u128)
            .build();
        let handle = self.bodies.insert(rigid_body);

        let mut collider = ColliderBuilder::cuboid(
            desc.half_extents.x,
            desc.half_extents.y,
            desc.half_extents.z,
        );
        if desc.kind == BodyKind::Dynamic && desc.mass > 0.0 {
            collider = collider.mass(desc.mass);
        }
        self.colliders
            .insert_with_parent(collider.build(), handle, &mut self.bodies);

        self.handles.push(Some(handle));
        tracing::debug!(body = id.0, kind = ?desc.kind, "rapier body added");
        id
    }

    fn remove_body(&mut self, body: BodyId) -> bool {
        let Some(handle) = self.handle(body) else {
            return false;
        };
        self.handles[body.0 as usize] = None;
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    fn linear_velocity(&self, body: BodyId) -> Option<Vec3> {
        let handle = self.handle(body)?;
        self.bodies.get(handle).map(|b| to_vec3(b.linvel()))
    }

    fn set_linear_velocity(&mut self, body: BodyId, velocity: Vec3) {
        if let Some(b) = self.handle(body).and_then(|h| self.bodies.get_mut(h)) {
            b.set_linvel(to_vector(velocity), true);
        }
    }

    fn translation(&self, body: BodyId) -> Option<Vec3> {
        let handle = self.handle(body)?;
        self.bodies.get(handle).map(|b| to_vec3(b.translation()))
    }

    fn set_translation(&mut self, body: BodyId, position: Vec3) {
        if let Some(b) = self.handle(body).and_then(|h| self.bodies.get_mut(h)) {
            b.set_translation(to_vector(position), true);
        }
    }

    fn apply_central_impulse(&mut self, body: BodyId, impulse: Vec3) {
        if let Some(b) = self.handle(body).and_then(|h| self.bodies.get_mut(h)) {
            b.apply_impulse(to_vector(impulse), true);
        }
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        self.damp_grounded(dt);
    }

    fn contacts(&self) -> Vec<Contact> {
        self.narrow_phase
            .contact_pairs()
            .filter(|pair| pair.has_any_active_contact)
            .filter_map(|pair| {
                let a = self.body_of_collider(pair.collider1)?;
                let b = self.body_of_collider(pair.collider2)?;
                Some(Contact { a, b })
            })
            .collect()
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
